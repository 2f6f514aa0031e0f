//! Domain layer containing the pure synchronization logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, state machine trait, validation errors)
//! - `stream` - Event records, frame decoding, dispatch table and session lifecycle
//! - `health` - Connection status and the probe-driven health classifier

pub mod foundation;
pub mod health;
pub mod stream;
