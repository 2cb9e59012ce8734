//! Reply relay: turns one user utterance into a stored exchange
//!
//! The user text is appended, the completion provider is asked for a reply,
//! the reply is appended, and the refreshed history is returned. Provider
//! failures never fail the request; they become a fixed assistant reply.

use std::sync::Arc;
use std::time::Duration;

use parley_common::Result;
use parley_llm::{CompletionRequest, LlmMessage, LlmService, DEFAULT_TIMEOUT};

use crate::domain::entities::{Message, MessageRole};
use crate::repository::MessageStore;

/// System instruction sent ahead of every user turn
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Output ceiling for provider replies
pub const MAX_REPLY_TOKENS: u32 = 512;

pub const TEMPERATURE: f32 = 0.7;

/// Assistant text recorded when the provider call fails
pub const PROVIDER_ERROR_REPLY: &str = "Error from completion provider, see server logs.";

/// Reply used when no provider credential is configured
pub fn echo_reply(text: &str) -> String {
    format!("Echo (no key): {}", text)
}

/// Result of a successful submit
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub reply: Message,
    pub history: Vec<Message>,
}

/// Relay between the message store and the completion provider
#[derive(Clone)]
pub struct ReplyRelay {
    store: Arc<MessageStore>,
    provider: Option<Arc<dyn LlmService>>,
    timeout: Duration,
}

impl ReplyRelay {
    /// `provider == None` runs the relay in echo mode
    pub fn new(store: Arc<MessageStore>, provider: Option<Arc<dyn LlmService>>) -> Self {
        Self {
            store,
            provider,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the provider call ceiling
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    pub fn is_echo_mode(&self) -> bool {
        self.provider.is_none()
    }

    /// Store `text`, obtain and store a reply, return it with the full history
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome> {
        Message::validate_user_text(text)?;

        self.store
            .append(MessageRole::User, text.to_string())
            .await?;

        let reply_text = self.reply_text(text).await;

        let reply = self
            .store
            .append(MessageRole::Assistant, reply_text)
            .await?;

        let history = self.store.read_all().await?;

        Ok(SubmitOutcome { reply, history })
    }

    async fn reply_text(&self, text: &str) -> String {
        let provider = match &self.provider {
            Some(provider) => provider,
            None => return echo_reply(text),
        };

        let request = CompletionRequest {
            model: String::new(),
            messages: vec![LlmMessage::system(SYSTEM_PROMPT), LlmMessage::user(text)],
            max_tokens: Some(MAX_REPLY_TOKENS),
            temperature: Some(TEMPERATURE),
        };

        match tokio::time::timeout(self.timeout, provider.complete(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(model = %response.model, "Provider reply received");
                response.content
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Completion provider call failed");
                PROVIDER_ERROR_REPLY.to_string()
            }
            Err(_) => {
                tracing::error!(timeout = ?self.timeout, "Completion provider call timed out");
                PROVIDER_ERROR_REPLY.to_string()
            }
        }
    }
}
