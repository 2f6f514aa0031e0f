//! Shared URL validation for configuration sections

use super::error::ValidationError;

/// Accepts absolute `http`/`https` URLs with a host.
pub(super) fn validate_http_url(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }

    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ValidationError::InvalidUrl(field)),
    }
}
