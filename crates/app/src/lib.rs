//! Parley application composition root
//!
//! Wires the message store, the completion provider and the chat routes
//! into a single application.

use std::sync::Arc;

use axum::Router;
use parley_chat::{ChatState, MessageStore, ReplyRelay};
use parley_common::Config;
use parley_llm::{LlmConfig, LlmService, LlmServiceFactory};

/// Create the main application router with all routes
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    let store = MessageStore::open(&config.data_file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open message log: {}", e))?;

    let llm_config = LlmConfig::new(
        config.llm_api_key.clone(),
        config.llm_api_url.clone(),
        config.llm_model.clone(),
    );
    let provider: Option<Arc<dyn LlmService>> =
        LlmServiceFactory::create(&llm_config)?.map(Arc::from);

    let relay = ReplyRelay::new(Arc::new(store), provider);

    Ok(build_router(ChatState::new(relay)))
}

/// Compose domain routers with shared infrastructure routes
pub fn build_router(state: ChatState) -> Router {
    Router::new()
        .route(
            "/",
            axum::routing::get(|| async { concat!("Parley API v", env!("CARGO_PKG_VERSION")) }),
        )
        .merge(parley_chat::routes().with_state(state))
}
