//! Parley completion provider client
//!
//! Provides access to an external large-language-model service:
//! - OpenAI-compatible chat completions over HTTP for production
//! - Programmable mock service for testing
//!
//! When no API key is configured the factory returns no service at all and
//! callers decide what to reply with.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod mock;
pub mod openai;

pub use mock::{MockLlmBehavior, MockLlmService, MockOutcome};
pub use openai::OpenAiCompatService;

/// Default provider request ceiling
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    #[error("LLM request error: {0}")]
    Request(String),

    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    #[error("LLM rate limit exceeded")]
    RateLimit,

    #[error("LLM response error: {0}")]
    Response(String),
}

/// Chat role as understood by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmRole {
    System,
    User,
    Assistant,
}

/// One turn sent to the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: LlmRole,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            content: content.into(),
        }
    }
}

/// Provider-agnostic completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Empty string means "use the service default"
    pub model: String,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Completion result
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

/// LLM service configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// `None` disables the provider entirely
    pub api_key: Option<String>,
    pub endpoint: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint", &self.endpoint)
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmConfig {
    pub fn new(api_key: Option<String>, endpoint: String, default_model: String) -> Self {
        Self {
            api_key,
            endpoint,
            default_model,
            max_tokens: 512,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// LLM service trait for different providers
#[async_trait::async_trait]
pub trait LlmService: Send + Sync {
    /// Run a single completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// Factory for creating LlmService implementations
pub struct LlmServiceFactory;

impl LlmServiceFactory {
    /// Create the provider client, or `None` when no credential is configured
    pub fn create(config: &LlmConfig) -> Result<Option<Box<dyn LlmService>>, LlmError> {
        if config.api_key.is_none() {
            tracing::info!("No LLM API key configured, replies will be echoed locally");
            return Ok(None);
        }

        tracing::info!(endpoint = %config.endpoint, model = %config.default_model, "Creating OpenAI-compatible LLM service");
        let service = OpenAiCompatService::new(config.clone())?;
        Ok(Some(Box::new(service)))
    }
}
