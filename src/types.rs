//! Shared configuration types for rentiva-twofactor.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Client configuration, loaded by `config::load_config`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Auth Service.
    pub auth_service_url: String,
    /// Path of the on-disk key-value store (user blob, policy mirror).
    pub storage_path: PathBuf,
    /// Filter string for the logger, e.g. `info` or `rentiva_twofactor=debug`.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_service_url: "http://localhost:8080".to_string(),
            storage_path: PathBuf::from(".rentiva/local-store.json"),
            log_level: "info".to_string(),
        }
    }
}
