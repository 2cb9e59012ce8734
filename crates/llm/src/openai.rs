//! OpenAI-compatible Chat Completions Implementation
//!
//! Calls any endpoint speaking the `/v1/chat/completions` dialect (Groq,
//! OpenAI, local gateways) using the reqwest HTTP client.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{CompletionRequest, CompletionResponse, LlmConfig, LlmError, LlmMessage, LlmService};

/// Longest stringified body returned when no reply text can be located
const MAX_FALLBACK_CHARS: usize = 1000;

/// Chat completions request body
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// OpenAI-compatible LLM service implementation
pub struct OpenAiCompatService {
    client: Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiCompatService {
    /// Create a new service; fails when the config has no API key
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::Configuration("API key is required".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.config.timeout)
        } else {
            LlmError::Request(format!("HTTP request failed: {}", err))
        }
    }
}

/// Pull the reply text out of a provider response.
///
/// Tries `choices[0].message.content`, then `choices[0].text`, and finally
/// falls back to the stringified body cut to [`MAX_FALLBACK_CHARS`].
pub fn extract_reply(body: &Value) -> String {
    let choice = body.pointer("/choices/0");

    if let Some(text) = choice
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return text.to_string();
    }

    if let Some(text) = choice
        .and_then(|c| c.get("text"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    {
        return text.to_string();
    }

    body.to_string().chars().take(MAX_FALLBACK_CHARS).collect()
}

#[async_trait::async_trait]
impl LlmService for OpenAiCompatService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model
        };

        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        let body = ChatCompletionsRequest {
            model: &model,
            messages: &request.messages,
            max_tokens,
            temperature: request.temperature,
        };

        tracing::debug!(model = %model, max_tokens = %max_tokens, "Sending chat completions request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimit);
        }

        let raw = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(LlmError::Response(format!(
                "Provider returned {}: {}",
                status, raw
            )));
        }

        // Non-JSON bodies still go through the stringify fallback
        let parsed: Value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));

        let content = extract_reply(&parsed);
        let model = parsed
            .get("model")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(model);

        Ok(CompletionResponse { content, model })
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
