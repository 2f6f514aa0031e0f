//! ConnectionStatus enum for UI-facing network quality.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Network quality as shown to the user.
///
/// `BackOnline` is a short hysteresis state between a recovery and `Online`
/// so that a flapping network does not flicker the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Online,
    Unstable,
    Offline,
    BackOnline,
}

impl ConnectionStatus {
    /// Derived flag for observers that only care about "no network".
    pub fn is_offline(&self) -> bool {
        matches!(self, ConnectionStatus::Offline)
    }

    /// Returns true while the network is considered impaired.
    pub fn is_degraded(&self) -> bool {
        matches!(self, ConnectionStatus::Unstable | ConnectionStatus::Offline)
    }
}

impl StateMachine for ConnectionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionStatus::*;
        matches!(
            (self, target),
            (Online, Unstable)
                | (Online, Offline)
                | (Unstable, Offline)
                | (Unstable, BackOnline)
                | (Offline, BackOnline)
                | (BackOnline, Online)
                | (BackOnline, Unstable)
                | (BackOnline, Offline)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionStatus::*;
        match self {
            Online => vec![Unstable, Offline],
            Unstable => vec![Offline, BackOnline],
            Offline => vec![BackOnline],
            BackOnline => vec![Online, Unstable, Offline],
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::Unstable => "unstable",
            ConnectionStatus::Offline => "offline",
            ConnectionStatus::BackOnline => "back_online",
        };
        write!(f, "{}", s)
    }
}
