//! Application Configuration Module
//!
//! Centralizes configuration for the moodbuddy service. Settings are loaded
//! from environment variables here, at the edge; the core crate only ever
//! receives explicit configuration values.

use std::env;
use std::time::Duration;
use tracing::Level;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub chat_model: String,
    pub chat_endpoint: String,
    pub chat_timeout: Duration,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `GEMINI_API_KEY`: Your secret key for the Gemini API. Required.
    // *   `CHAT_MODEL`: (Optional) The chat model. Defaults to "gemini-1.5-flash".
    // *   `CHAT_ENDPOINT`: (Optional) Base URL of the chat API. Defaults to
    //     "https://generativelanguage.googleapis.com".
    // *   `CHAT_TIMEOUT_SECS`: (Optional) Per-request timeout. Defaults to 30.
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. Useful for local development, ignored if not present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let gemini_api_key = get("GEMINI_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let chat_model = get("CHAT_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string());
        let chat_endpoint = get("CHAT_ENDPOINT")
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com".to_string());

        let timeout_str = get("CHAT_TIMEOUT_SECS").unwrap_or_else(|| "30".to_string());
        let timeout_secs = timeout_str
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidVar("CHAT_TIMEOUT_SECS", timeout_str))?;

        let log_level_str = get("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            gemini_api_key,
            chat_model,
            chat_endpoint,
            chat_timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }
}
