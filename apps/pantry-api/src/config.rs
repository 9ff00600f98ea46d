//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use pantry_db::DbConfig;
use pantry_lookup::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use pantry_lookup::SourceConfig;

/// API server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Base URL of the external product database
    pub product_api_url: String,

    /// Per-lookup timeout
    pub lookup_timeout: Duration,

    /// User agent for upstream requests
    pub user_agent: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            bind_addr: get("PANTRY_BIND_ADDR")
                .unwrap_or_else(|| "0.0.0.0:8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PANTRY_BIND_ADDR".to_string()))?,

            database_path: get("PANTRY_DATABASE_PATH")
                .unwrap_or_else(|| "./data/pantry.db".to_string())
                .into(),

            db_max_connections: get("PANTRY_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PANTRY_DB_MAX_CONNECTIONS".to_string()))?,

            product_api_url: get("PANTRY_PRODUCT_API_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),

            lookup_timeout: get("PANTRY_LOOKUP_TIMEOUT_SECS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue("PANTRY_LOOKUP_TIMEOUT_SECS".to_string()))?,

            user_agent: get("PANTRY_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PANTRY_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.lookup_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "PANTRY_LOOKUP_TIMEOUT_SECS".to_string(),
            ));
        }
        if config.product_api_url.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "PANTRY_PRODUCT_API_URL".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }

    /// Product source settings derived from this configuration.
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::new(&self.product_api_url)
            .timeout(self.lookup_timeout)
            .user_agent(&self.user_agent)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
