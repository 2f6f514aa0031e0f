//! Connection health monitor configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::url::validate_http_url;

/// Health monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Cheap, stable endpoint used for connectivity probes
    #[serde(default = "default_probe_url")]
    pub probe_url: String,

    /// Seconds between probes
    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    /// Per-probe timeout in seconds; must be below the interval
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Seconds spent in BackOnline before reverting to Online
    #[serde(default = "default_back_online_grace")]
    pub back_online_grace_secs: u64,
}

impl HealthConfig {
    /// Get probe interval as Duration
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    /// Get probe timeout as Duration
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Get BackOnline grace window as Duration
    pub fn back_online_grace(&self) -> Duration {
        Duration::from_secs(self.back_online_grace_secs)
    }

    /// Validate health configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_http_url(&self.probe_url, "HEALTH__PROBE_URL")?;
        if self.probe_interval_secs == 0 {
            return Err(ValidationError::ZeroDuration("HEALTH__PROBE_INTERVAL_SECS"));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ValidationError::ZeroDuration("HEALTH__PROBE_TIMEOUT_SECS"));
        }
        if self.back_online_grace_secs == 0 {
            return Err(ValidationError::ZeroDuration("HEALTH__BACK_ONLINE_GRACE_SECS"));
        }
        if self.probe_timeout_secs >= self.probe_interval_secs {
            return Err(ValidationError::ProbeTimeoutNotBelowInterval);
        }
        Ok(())
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            probe_url: default_probe_url(),
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
            back_online_grace_secs: default_back_online_grace(),
        }
    }
}

fn default_probe_url() -> String {
    "https://clients3.google.com/generate_204".to_string()
}

fn default_probe_interval() -> u64 {
    8
}

fn default_probe_timeout() -> u64 {
    7
}

fn default_back_online_grace() -> u64 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_config_defaults() {
        let config = HealthConfig::default();
        assert_eq!(config.probe_interval(), Duration::from_secs(8));
        assert_eq!(config.probe_timeout(), Duration::from_secs(7));
        assert_eq!(config.back_online_grace(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_must_be_below_interval() {
        let config = HealthConfig {
            probe_timeout_secs: 8,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::ProbeTimeoutNotBelowInterval)
        );
    }

    #[test]
    fn test_zero_grace_rejected() {
        let config = HealthConfig {
            back_online_grace_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
