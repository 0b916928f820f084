//! services/sync/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub log_level: Level,
    /// The user this device syncs and heartbeats on behalf of.
    pub user_id: String,
    /// Where the local key-value store persists its JSON map.
    pub storage_path: PathBuf,
    /// How often the daemon runs the reconciler.
    pub sync_interval: Duration,
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

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let user_id = std::env::var("SYNC_USER_ID")
            .map_err(|_| ConfigError::MissingVar("SYNC_USER_ID".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_path = std::env::var("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./studymate-offline.json"));

        let sync_interval_str =
            std::env::var("SYNC_INTERVAL_SECS").unwrap_or_else(|_| "300".to_string());
        let sync_interval_secs = sync_interval_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "SYNC_INTERVAL_SECS".to_string(),
                format!("'{}' is not a number of seconds", sync_interval_str),
            )
        })?;

        Ok(Self {
            database_url,
            log_level,
            user_id,
            storage_path,
            sync_interval: Duration::from_secs(sync_interval_secs),
        })
    }
}
