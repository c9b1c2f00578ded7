use thiserror::Error;

use crate::auth::DEFAULT_TOKEN_TTL_SECS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Directory holding the embedded database.
    pub data_dir: String,
    /// Directory holding uploaded blobs.
    pub storage_path: String,
    /// HTTP body ceiling for upload routes, in bytes.
    pub max_upload_size: u64,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    /// How often the orphan-blob reconciler runs. Zero disables it.
    pub reconcile_interval_secs: u64,
    /// Blobs younger than this are never reclaimed.
    pub reconcile_grace_secs: u64,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let storage_path =
            std::env::var("STORAGE_PATH").unwrap_or_else(|_| "./uploads".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(200 * 1024 * 1024); // 200MB, the video ceiling

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let reconcile_interval_secs = std::env::var("RECONCILE_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let reconcile_grace_secs = std::env::var("RECONCILE_GRACE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86_400);

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let config = Config {
            bind_address,
            data_dir,
            storage_path,
            max_upload_size,
            jwt_secret,
            token_ttl_secs,
            reconcile_interval_secs,
            reconcile_grace_secs,
            test_mode,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT_SECRET must be set".to_string(),
            ));
        }

        if self.token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "TOKEN_TTL_SECS must be positive".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
