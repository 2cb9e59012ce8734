//! Shared configuration, error handling, and extractors for Parley
//!
//! This crate provides common functionality used across the Parley service:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Request extractors

pub mod config;
pub mod error;
pub mod extractors;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
