//! Domain entities for the Chat domain
//!
//! A [`Message`] is one immutable turn of the chat log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_common::{Error, Result};

/// Client-facing error text for a missing, non-string, or blank `text`
pub const TEXT_REQUIRED: &str = "text is required";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    /// Older logs stored assistant turns as `"ai"`
    #[serde(alias = "ai")]
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Message entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh id stamped with the current time
    pub fn new(role: MessageRole, text: String) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            created_at: Utc::now(),
        }
    }

    /// Reject empty or whitespace-only user text
    pub fn validate_user_text(text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput(TEXT_REQUIRED.to_string()));
        }
        Ok(())
    }
}
