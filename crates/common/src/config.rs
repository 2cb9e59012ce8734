//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config. Every value is optional:
//! a missing provider key puts the relay in echo mode instead of failing.

use anyhow::Result;
use std::env;
use std::path::PathBuf;

const DEFAULT_LLM_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "llama3-8b-8192";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_DATA_FILE: &str = "db.json";
const DEFAULT_RUST_LOG: &str = "parley=info,tower_http=info";

#[derive(Clone)]
pub struct Config {
    /// Completion provider credential; `None` enables echo mode
    pub llm_api_key: Option<String>,
    /// Completion provider chat-completions endpoint
    pub llm_api_url: String,
    pub llm_model: String,

    /// Path of the JSON message log
    pub data_file: PathBuf,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

// Hand-written so the API key never reaches logs.
impl std::fmt::Debug for Config {
    #[mutants::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("llm_api_url", &self.llm_api_url)
            .field("llm_model", &self.llm_model)
            .field("data_file", &self.data_file)
            .field("rust_log", &self.rust_log)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(port = %raw, "Invalid PORT, using default {}", DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Ok(Self {
            llm_api_key: non_empty("LLM_API_KEY"),
            llm_api_url: non_empty("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: non_empty("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            data_file: non_empty("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| DEFAULT_RUST_LOG.to_string()),
            port,
        })
    }

    /// Whether a provider credential is configured
    pub fn has_llm_key(&self) -> bool {
        self.llm_api_key.is_some()
    }
}
