//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid URL for {0} (expected http or https)")]
    InvalidUrl(&'static str),

    #[error("Duration {0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Probe timeout must be shorter than the probe interval")]
    ProbeTimeoutNotBelowInterval,
}
