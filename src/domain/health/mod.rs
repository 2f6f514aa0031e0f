//! Health module - classification of network quality from probe results.

mod connection_status;
mod health_tracker;

pub use connection_status::ConnectionStatus;
pub use health_tracker::{HealthTracker, HealthTransition, ProbeOutcome, OFFLINE_FAILURE_THRESHOLD};
