//! Configuration System
//!
//! TOML-based configuration with environment variable override support,
//! following the same file-then-env layering as the rest of the stack.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub postgres: PostgresConfig,
    pub auth: AuthConfig,
    pub queue: QueueConfig,
    pub worker: WorkerConfig,

    /// Enable development mode (relaxes key prefixes, verbose logging).
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            postgres: PostgresConfig::default(),
            auth: AuthConfig::default(),
            queue: QueueConfig::default(),
            worker: WorkerConfig::default(),
            dev_mode: false,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.len() < 16 && !self.dev_mode {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must be at least 16 bytes outside dev_mode".to_string(),
            ));
        }
        if self.postgres.url.is_empty() {
            return Err(ConfigError::ValidationError(
                "postgres.url must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec![],
        }
    }
}

/// Postgres persistence gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/flowcatalyst".to_string(),
            max_connections: 10,
        }
    }
}

/// Auth resolver configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to verify `PUBLIC_JWT` tokens (§4.1).
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Minimum accepted length for any API key, per §6.
    pub min_api_key_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "flowcatalyst".to_string(),
            min_api_key_length: 8,
        }
    }
}

/// Durable work queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub poll_interval_ms: u64,
    pub batch_size: u32,
    pub visibility_timeout_seconds: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            batch_size: 10,
            visibility_timeout_seconds: 30,
        }
    }
}

/// Worker binary configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum dispatcher invocations processed concurrently.
    pub dispatch_concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            dispatch_concurrency: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.http.port, config.http.port);
    }

    #[test]
    fn validate_rejects_short_secret_outside_dev_mode() {
        let mut config = AppConfig::default();
        config.postgres.url = "postgres://x".to_string();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
        config.dev_mode = true;
        assert!(config.validate().is_ok());
    }
}
