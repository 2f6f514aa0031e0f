//! Credential Provider Port - source of the current bearer credential.

/// Port for reading the session credential.
///
/// The value may change between reconnects, so callers read it on every
/// connection attempt instead of caching it.
pub trait CredentialProvider: Send + Sync {
    /// Current credential, or `None` when signed out.
    fn current_credential(&self) -> Option<String>;
}
