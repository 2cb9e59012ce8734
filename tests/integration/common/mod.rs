//! Common test utilities and fixtures for integration tests
//!
//! This module provides shared infrastructure for all integration tests:
//! - Temporary message log per test app
//! - Echo-mode and mock-provider app construction
//! - Request builders and body parsing

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use parley_chat::{ChatState, MessageStore, ReplyRelay};
use parley_llm::{LlmService, MockLlmService};
use serde_json::Value;
use tempfile::TempDir;

/// Test application backed by a throwaway message log
pub struct ChatTestApp {
    dir: TempDir,
    pub store: Arc<MessageStore>,
    pub mock: Option<MockLlmService>,
    router: Router,
}

impl ChatTestApp {
    /// App without a provider credential (echo mode)
    pub async fn new() -> Result<Self> {
        Self::build(tempfile::tempdir()?, None, None).await
    }

    /// App whose provider is the given mock
    pub async fn with_provider(mock: MockLlmService) -> Result<Self> {
        Self::build(tempfile::tempdir()?, Some(mock), None).await
    }

    /// App whose provider calls are cut off after `timeout`
    pub async fn with_provider_timeout(mock: MockLlmService, timeout: Duration) -> Result<Self> {
        Self::build(tempfile::tempdir()?, Some(mock), Some(timeout)).await
    }

    /// Write `contents` as the log before the app opens it
    pub async fn with_existing_log(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("db.json"), contents)?;
        Self::build(dir, None, None).await
    }

    async fn build(
        dir: TempDir,
        mock: Option<MockLlmService>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let store = Arc::new(MessageStore::open(dir.path().join("db.json")).await?);

        let provider = mock
            .clone()
            .map(|m| Arc::new(m) as Arc<dyn LlmService>);
        let mut relay = ReplyRelay::new(Arc::clone(&store), provider);
        if let Some(timeout) = timeout {
            relay = relay.with_timeout(timeout);
        }

        let router = parley_app::build_router(ChatState::new(relay));

        Ok(Self {
            dir,
            store,
            mock,
            router,
        })
    }

    /// Simulate a process restart on the same log file
    pub async fn restart(self) -> Result<Self> {
        let mock = self.mock.clone();
        Self::build(self.dir, mock, None).await
    }

    pub fn test_router(&self) -> Router {
        self.router.clone()
    }

    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("db.json")
    }

    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Build a POST /message request with a JSON body
pub fn post_message(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/message")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a POST /message request with a raw body
pub fn post_raw(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/message")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a body-less GET request
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON Value
pub async fn parse_body(response: axum::http::Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
