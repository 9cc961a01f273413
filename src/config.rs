//! Environment-based configuration loading.

use std::env;
use std::path::PathBuf;

use crate::types::{ClientConfig, ConfigError};

/// Loads configuration from the environment, falling back to defaults.
///
/// Reads `AUTH_SERVICE_URL`, `TWOFACTOR_STORAGE_PATH`, and `LOG_LEVEL`.
/// A `.env` file is honored when present.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let defaults = ClientConfig::default();

    let config = ClientConfig {
        auth_service_url: env::var("AUTH_SERVICE_URL").unwrap_or(defaults.auth_service_url),
        storage_path: env::var("TWOFACTOR_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path),
        log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
    };

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.auth_service_url.is_empty() {
        return Err(ConfigError::Invalid("Auth service URL can't be empty".to_string()));
    }
    if !config.auth_service_url.starts_with("http://")
        && !config.auth_service_url.starts_with("https://")
    {
        return Err(ConfigError::Invalid(format!(
            "Auth service URL must be http(s): {}",
            config.auth_service_url
        )));
    }
    Ok(())
}

/// Initializes the global logger from the configured filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(config: &ClientConfig) {
    let _ = env_logger::Builder::new().parse_filters(&config.log_level).try_init();
}
