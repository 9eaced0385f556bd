//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths.
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "flowcatalyst.toml",
    "./config/config.toml",
    "/etc/flowcatalyst/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("FLOWCATALYST_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("FC_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("FC_HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("FC_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Postgres
        if let Ok(val) = env::var("FC_POSTGRES_URL") {
            config.postgres.url = val;
        }
        if let Ok(val) = env::var("FC_POSTGRES_MAX_CONNECTIONS") {
            if let Ok(n) = val.parse() {
                config.postgres.max_connections = n;
            }
        }

        // Auth
        if let Ok(val) = env::var("FC_AUTH_JWT_SECRET") {
            config.auth.jwt_secret = val;
        }
        if let Ok(val) = env::var("FC_AUTH_JWT_ISSUER") {
            config.auth.jwt_issuer = val;
        }
        if let Ok(val) = env::var("FC_AUTH_MIN_API_KEY_LENGTH") {
            if let Ok(n) = val.parse() {
                config.auth.min_api_key_length = n;
            }
        }

        // Queue
        if let Ok(val) = env::var("FC_QUEUE_POLL_INTERVAL_MS") {
            if let Ok(n) = val.parse() {
                config.queue.poll_interval_ms = n;
            }
        }
        if let Ok(val) = env::var("FC_QUEUE_BATCH_SIZE") {
            if let Ok(n) = val.parse() {
                config.queue.batch_size = n;
            }
        }
        if let Ok(val) = env::var("FC_QUEUE_VISIBILITY_TIMEOUT_SECONDS") {
            if let Ok(n) = val.parse() {
                config.queue.visibility_timeout_seconds = n;
            }
        }

        // Worker
        if let Ok(val) = env::var("FC_WORKER_DISPATCH_CONCURRENCY") {
            if let Ok(n) = val.parse() {
                config.worker.dispatch_concurrency = n;
            }
        }

        // Dev mode
        if let Ok(val) = env::var("FC_DEV_MODE") {
            config.dev_mode = val.parse().unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins_over_file_default() {
        env::set_var("FC_HTTP_PORT", "9999");
        let loader = ConfigLoader::new();
        let mut config = AppConfig::default();
        loader.apply_env_overrides(&mut config);
        assert_eq!(config.http.port, 9999);
        env::remove_var("FC_HTTP_PORT");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let loader = ConfigLoader::with_path("/nonexistent/path/config.toml");
        assert!(loader.find_config_file().is_none());
    }
}
