//! Event stream configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::url::validate_http_url;

/// Event stream configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Base URL of the streaming API; events are read from
    /// `{base_url}/projects/{id}/events`
    pub base_url: String,

    /// Delay before reconnecting after a drop, in seconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

impl StreamConfig {
    /// Creates a configuration with default timing.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }

    /// Get reconnect delay as Duration
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Validate stream configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url(&self.base_url, "STREAM__BASE_URL")?;
        if self.reconnect_delay_secs == 0 {
            return Err(ValidationError::ZeroDuration("STREAM__RECONNECT_DELAY_SECS"));
        }
        Ok(())
    }
}

fn default_reconnect_delay() -> u64 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_config_defaults() {
        let config = StreamConfig::new("https://stream.example.com");
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_reconnect_delay_rejected() {
        let config = StreamConfig {
            reconnect_delay_secs: 0,
            ..StreamConfig::new("https://stream.example.com")
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ZeroDuration("STREAM__RECONNECT_DELAY_SECS"))
        );
    }
}
