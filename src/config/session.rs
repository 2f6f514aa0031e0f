//! Signed-in session configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which project to follow and with which credential
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Project to subscribe to
    pub project_id: String,

    /// Bearer token; anonymous streams when absent
    pub token: Option<String>,
}

impl SessionConfig {
    /// Token with blank values treated as absent
    pub fn token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.trim().is_empty())
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.project_id.trim().is_empty() {
            return Err(ValidationError::MissingRequired("SESSION__PROJECT_ID"));
        }
        Ok(())
    }
}
