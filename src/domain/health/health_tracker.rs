//! Timer-free connection health classifier.
//!
//! The monitor loop owns one [`HealthTracker`] and feeds it probe outcomes,
//! hard failures and revert deadlines. Each call returns a
//! [`HealthTransition`] telling the loop whether the revert timer must be
//! cancelled and whether a new one must be armed.

use crate::domain::foundation::StateMachine;

use super::connection_status::ConnectionStatus;

/// Consecutive failures at which the status becomes `Offline`.
pub const OFFLINE_FAILURE_THRESHOLD: u32 = 2;

/// Result of one connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success,
    Failure,
}

/// Status change produced by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthTransition {
    pub previous: ConnectionStatus,
    pub current: ConnectionStatus,
}

impl HealthTransition {
    /// Returns true if the status changed.
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }

    /// Returns true if the "revert to Online" timer must be armed.
    pub fn arms_revert(&self) -> bool {
        self.changed() && self.current == ConnectionStatus::BackOnline
    }
}

/// Consecutive-failure counter plus the current status.
#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    status: ConnectionStatus,
    consecutive_failures: u32,
}

impl HealthTracker {
    /// Creates a tracker in `Online` with no failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status.
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Consecutive probe failures since the last success.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Applies the outcome of one probe.
    pub fn record_probe(&mut self, outcome: ProbeOutcome) -> HealthTransition {
        match outcome {
            ProbeOutcome::Success => {
                self.consecutive_failures = 0;
                if self.status.is_degraded() {
                    self.move_to(ConnectionStatus::BackOnline)
                } else {
                    self.unchanged()
                }
            }
            ProbeOutcome::Failure => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                if self.consecutive_failures >= OFFLINE_FAILURE_THRESHOLD {
                    self.move_to(ConnectionStatus::Offline)
                } else {
                    self.move_to(ConnectionStatus::Unstable)
                }
            }
        }
    }

    /// Forces `Offline` after a caller observed a connectivity-class error.
    pub fn record_hard_failure(&mut self) -> HealthTransition {
        self.consecutive_failures = OFFLINE_FAILURE_THRESHOLD;
        self.move_to(ConnectionStatus::Offline)
    }

    /// Completes the grace window: `BackOnline` becomes `Online`.
    pub fn revert_elapsed(&mut self) -> HealthTransition {
        if self.status == ConnectionStatus::BackOnline {
            self.move_to(ConnectionStatus::Online)
        } else {
            self.unchanged()
        }
    }

    /// Returns to `Online` with no failures, bypassing transition rules.
    pub fn reset(&mut self) -> HealthTransition {
        let previous = self.status;
        self.status = ConnectionStatus::Online;
        self.consecutive_failures = 0;
        HealthTransition {
            previous,
            current: self.status,
        }
    }

    fn move_to(&mut self, next: ConnectionStatus) -> HealthTransition {
        let previous = self.status;
        if previous != next {
            debug_assert!(
                previous.can_transition_to(&next),
                "invalid health transition {:?} -> {:?}",
                previous,
                next
            );
            self.status = next;
        }
        HealthTransition {
            previous,
            current: self.status,
        }
    }

    fn unchanged(&self) -> HealthTransition {
        HealthTransition {
            previous: self.status,
            current: self.status,
        }
    }
}
