//! Configuration file parsing for the API server.
//!
//! Loads settings from TOML files including bind address, database path,
//! JWT secret and token expiry.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// API configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// API configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// SQLite database path; ":memory:" for an in-memory store
    pub database_path: String,

    /// JWT secret for verifying session tokens
    pub jwt_secret: String,

    /// Token expiry in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,

    /// Capacity of the realtime notification channel
    #[serde(default = "default_realtime_capacity")]
    pub realtime_capacity: usize,
}

/// Default token expiry: 1 hour
fn default_token_expiry() -> u64 {
    3600
}

fn default_realtime_capacity() -> usize {
    agora_notify::DEFAULT_CHANNEL_CAPACITY
}

impl ApiConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ApiConfig = toml::from_str(&contents)?;

        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingField("jwt_secret".to_string()));
        }
        if config.database_path.is_empty() {
            return Err(ConfigError::MissingField("database_path".to_string()));
        }

        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: ":memory:".to_string(),
            jwt_secret: "test-secret-do-not-use-in-production".to_string(),
            token_expiry_secs: 3600,
            realtime_capacity: agora_notify::DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// The full bind address, e.g. "127.0.0.1:8080"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "agora.db"
            jwt_secret = "secret"
        "#;
        let config: ApiConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.token_expiry_secs, 3600);
        assert_eq!(
            config.realtime_capacity,
            agora_notify::DEFAULT_CHANNEL_CAPACITY
        );
    }

    #[test]
    fn test_missing_file_errors() {
        assert!(matches!(
            ApiConfig::from_file("/nonexistent/agora.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }
}
