//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Public path under which uploaded images are served and referenced.
pub const UPLOADS_PREFIX: &str = "/uploads";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the product collection lives between restarts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageMode {
    /// Products are kept in memory and lost on restart.
    Memory,
    /// Products are written to a JSON document after every mutation.
    JsonFile(PathBuf),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub public_base_url: String,
    pub uploads_dir: PathBuf,
    pub storage: StorageMode,
    pub placeholder_image_url: Option<String>,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Image Settings ---
        let public_base_url = match var("PUBLIC_BASE_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::InvalidValue(
                    "PUBLIC_BASE_URL".to_string(),
                    format!("'{}' must start with http:// or https://", url),
                ))
            }
            None => format!("http://localhost:{}", bind_address.port()),
        };

        let uploads_dir = var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./uploads"));

        let placeholder_image_url = var("PLACEHOLDER_IMAGE_URL");

        // --- Persistence Settings ---
        let storage = match var("STORAGE_MODE")
            .unwrap_or_else(|| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageMode::Memory,
            "json" => StorageMode::JsonFile(
                var("DATA_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data/products.json")),
            ),
            other => {
                return Err(ConfigError::InvalidValue(
                    "STORAGE_MODE".to_string(),
                    format!("'{}' is not one of 'json' or 'memory'", other),
                ))
            }
        };

        let cors_allowed_origin = var("CORS_ALLOWED_ORIGIN");

        Ok(Self {
            bind_address,
            log_level,
            public_base_url,
            uploads_dir,
            storage,
            placeholder_image_url,
            cors_allowed_origin,
        })
    }
}
