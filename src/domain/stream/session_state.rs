//! Stream session lifecycle and subscription key.

use secrecy::{ExposeSecret, Secret};
use std::fmt;

use crate::domain::foundation::{ProjectId, StateMachine};

/// Lifecycle of a stream session.
///
/// ```text
/// Idle ──► Connecting ──► Streaming ──► Disconnecting ──► Idle
///              │              │
///              └──► Faulted ◄─┘ ──(reconnect)──► Connecting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Connecting,
    Streaming,
    Disconnecting,
    Faulted,
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Connecting, Streaming)
                | (Connecting, Faulted)
                | (Connecting, Disconnecting)
                | (Streaming, Faulted)
                | (Streaming, Disconnecting)
                | (Faulted, Connecting)
                | (Faulted, Disconnecting)
                | (Disconnecting, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Idle => vec![Connecting],
            Connecting => vec![Streaming, Faulted, Disconnecting],
            Streaming => vec![Faulted, Disconnecting],
            Faulted => vec![Connecting, Disconnecting],
            Disconnecting => vec![Idle],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Disconnecting => "disconnecting",
            SessionState::Faulted => "faulted",
        };
        write!(f, "{}", s)
    }
}

/// Identifies the logical stream a session follows.
///
/// Replaced wholesale when the project changes; only the credential is
/// updated in place when the project stays the same.
#[derive(Debug, Clone)]
pub struct SubscriptionKey {
    project_id: ProjectId,
    credential: Option<Secret<String>>,
}

impl SubscriptionKey {
    /// Creates a key; blank credentials are treated as absent.
    pub fn new(project_id: ProjectId, credential: Option<String>) -> Self {
        Self {
            project_id,
            credential: normalize_credential(credential),
        }
    }

    /// The subscribed project.
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// The credential supplied with the last target update, if any.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.expose_secret().as_str())
    }

    /// Replaces the credential, keeping the project.
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = normalize_credential(credential);
    }

    /// Returns true if this key follows `project_id`.
    pub fn targets(&self, project_id: &ProjectId) -> bool {
        &self.project_id == project_id
    }
}

fn normalize_credential(credential: Option<String>) -> Option<Secret<String>> {
    credential
        .filter(|c| !c.trim().is_empty())
        .map(Secret::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id).unwrap()
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn streaming_cannot_jump_to_idle() {
        assert!(SessionState::Streaming.transition_to(SessionState::Idle).is_err());
        assert!(SessionState::Streaming
            .transition_to(SessionState::Disconnecting)
            .is_ok());
    }

    #[test]
    fn every_state_has_an_exit() {
        for state in [
            SessionState::Idle,
            SessionState::Connecting,
            SessionState::Streaming,
            SessionState::Disconnecting,
            SessionState::Faulted,
        ] {
            assert!(!state.valid_transitions().is_empty(), "{state} should have an exit");
        }
    }

    #[test]
    fn blank_credential_is_absent() {
        let key = SubscriptionKey::new(project("p"), Some("  ".into()));
        assert_eq!(key.credential(), None);
    }

    #[test]
    fn credential_is_replaced_in_place() {
        let mut key = SubscriptionKey::new(project("p"), Some("old".into()));
        key.set_credential(Some("new".into()));
        assert_eq!(key.credential(), Some("new"));
        assert!(key.targets(&project("p")));
        assert!(!key.targets(&project("q")));
    }

    #[test]
    fn debug_output_redacts_credential() {
        let key = SubscriptionKey::new(project("p"), Some("s3cret".into()));
        assert!(!format!("{:?}", key).contains("s3cret"));
    }
}
