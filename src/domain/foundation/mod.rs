//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the state machine trait and the validation
//! error type used by the stream and health modules.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{FrameId, ProjectId};
pub use state_machine::StateMachine;
