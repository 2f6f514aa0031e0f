//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PROJECT_SYNC` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use project_sync::config::SyncConfig;
//!
//! let config = SyncConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Streaming from {}", config.stream.base_url);
//! ```

mod api;
mod error;
mod health;
mod log;
mod session;
mod stream;
mod url;

pub use api::ApiConfig;
pub use error::{ConfigError, ValidationError};
pub use health::HealthConfig;
pub use log::LogConfig;
pub use session::SessionConfig;
pub use stream::StreamConfig;

use serde::Deserialize;

/// Root configuration
///
/// Load using [`SyncConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Event stream endpoint and reconnect timing
    pub stream: StreamConfig,

    /// Connectivity probe endpoint and timing
    #[serde(default)]
    pub health: HealthConfig,

    /// REST API used by the project store
    pub api: ApiConfig,

    /// Project and credential to follow
    pub session: SessionConfig,

    /// Logging output
    #[serde(default)]
    pub log: LogConfig,
}

impl SyncConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PROJECT_SYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PROJECT_SYNC__STREAM__BASE_URL=https://...` -> `stream.base_url`
    /// - `PROJECT_SYNC__HEALTH__PROBE_INTERVAL_SECS=8` -> `health.probe_interval_secs`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROJECT_SYNC")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.stream.validate()?;
        self.health.validate()?;
        self.api.validate()?;
        self.session.validate()?;
        Ok(())
    }
}
