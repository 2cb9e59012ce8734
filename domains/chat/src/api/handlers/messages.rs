//! Message API handlers

use axum::{extract::State, Json};
use parley_common::{Error, Result, ValidatedJson};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::api::middleware::ChatState;
use crate::domain::entities::{Message, TEXT_REQUIRED};

/// Request for sending a message.
///
/// `text` is kept as raw JSON so a missing or non-string value is reported
/// as a validation failure rather than a deserialization error.
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_text"))]
    pub text: serde_json::Value,
}

fn validate_text(value: &serde_json::Value) -> std::result::Result<(), ValidationError> {
    match value.as_str() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::new("required").with_message(TEXT_REQUIRED.into())),
    }
}

/// Response for send message (assistant reply plus refreshed history)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub ai_message: Message,
    pub history: Vec<Message>,
}

/// Relay a user message and return the assistant reply with the full log
pub async fn send_message(
    State(state): State<ChatState>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>> {
    let text = req
        .text
        .as_str()
        .ok_or_else(|| Error::InvalidInput(TEXT_REQUIRED.to_string()))?;

    let outcome = state.relay.submit(text).await?;

    Ok(Json(SendMessageResponse {
        ai_message: outcome.reply,
        history: outcome.history,
    }))
}

/// List the whole chat log in insertion order
pub async fn list_history(State(state): State<ChatState>) -> Result<Json<Vec<Message>>> {
    let messages = state.store.read_all().await?;
    Ok(Json(messages))
}
