//! Project data API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::url::validate_http_url;

/// Configuration of the REST API used for full refetches
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL; resources live under `{base_url}/projects/{id}/...`
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Creates a configuration with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate API configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url(&self.base_url, "API__BASE_URL")?;
        if self.timeout_secs == 0 {
            return Err(ValidationError::ZeroDuration("API__TIMEOUT_SECS"));
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    30
}
