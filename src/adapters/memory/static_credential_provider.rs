//! CredentialProvider backed by a replaceable in-memory value.

use std::sync::RwLock;

use crate::ports::CredentialProvider;

/// Holds the current credential; `set` swaps it for the next connection attempt.
#[derive(Debug, Default)]
pub struct StaticCredentialProvider {
    credential: RwLock<Option<String>>,
}

impl StaticCredentialProvider {
    /// Creates a provider holding `credential`.
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: RwLock::new(credential),
        }
    }

    /// Replaces the credential (e.g. after a token refresh or sign-out).
    pub fn set(&self, credential: Option<String>) {
        match self.credential.write() {
            Ok(mut guard) => *guard = credential,
            Err(poisoned) => *poisoned.into_inner() = credential,
        }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn current_credential(&self) -> Option<String> {
        match self.credential.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
