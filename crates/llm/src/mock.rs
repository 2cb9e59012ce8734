//! Mock LLM Service Implementation
//!
//! Programmable mock for testing relay workflows:
//! - `MockLlmService`: configurable mock with request recording
//! - `MockLlmBehavior`: controls outcome and delay
//! - `MockOutcome`: Reply, Fail, or Timeout

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::{CompletionRequest, CompletionResponse, LlmError, LlmService};

/// What outcome the mock should produce
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockOutcome {
    /// Reply with "Mock response to: <last message>"
    #[default]
    Reply,
    /// Reply with a fixed text
    FixedReply(String),
    /// Fail as if the provider returned an error
    Fail,
    /// Fail as if the provider timed out
    Timeout,
}

/// Programmable behavior for the mock LLM service
#[derive(Debug, Clone, Default)]
pub struct MockLlmBehavior {
    pub outcome: Arc<RwLock<MockOutcome>>,
    pub delay_ms: Arc<RwLock<u64>>,
}

impl MockLlmBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock outcome
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.write().unwrap() = outcome;
    }

    /// Configure delay before answering
    pub fn set_delay_ms(&self, delay: u64) {
        *self.delay_ms.write().unwrap() = delay;
    }

    /// Read current outcome
    pub fn get_outcome(&self) -> MockOutcome {
        self.outcome.read().unwrap().clone()
    }

    /// Read current delay
    pub fn get_delay_ms(&self) -> u64 {
        *self.delay_ms.read().unwrap()
    }
}

/// Mock LLM service with programmable behavior
#[derive(Debug, Clone, Default)]
pub struct MockLlmService {
    behavior: MockLlmBehavior,
    history: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLlmService {
    /// Create a new mock LLM service
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that immediately produces `outcome`
    pub fn with_outcome(outcome: MockOutcome) -> Self {
        let service = Self::new();
        service.behavior.set_outcome(outcome);
        service
    }

    /// Handle for reprogramming the mock after it has been shared
    pub fn behavior(&self) -> &MockLlmBehavior {
        &self.behavior
    }

    /// Requests received so far, oldest first
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.history.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::info!("Mock LLM service processing completion request");

        self.history.lock().unwrap().push(request.clone());

        let delay = self.behavior.get_delay_ms();
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let model = if request.model.is_empty() {
            "mock-model".to_string()
        } else {
            request.model
        };

        let content = match self.behavior.get_outcome() {
            MockOutcome::Reply => {
                let last_message = request
                    .messages
                    .last()
                    .map(|m| m.content.as_str())
                    .unwrap_or("empty");
                format!("Mock response to: {}", last_message)
            }
            MockOutcome::FixedReply(text) => text,
            MockOutcome::Fail => {
                return Err(LlmError::Response("Mock provider failure".to_string()))
            }
            MockOutcome::Timeout => return Err(LlmError::Timeout(Duration::from_millis(delay))),
        };

        Ok(CompletionResponse { content, model })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
