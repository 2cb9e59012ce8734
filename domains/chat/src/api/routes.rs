//! Route definitions for Chat domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, messages};
use super::middleware::ChatState;

/// Create all Chat domain API routes
pub fn routes() -> Router<ChatState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/history", get(messages::list_history))
        .route("/message", post(messages::send_message))
}
