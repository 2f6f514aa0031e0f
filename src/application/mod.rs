//! Application layer - the long-running loops of the synchronization core.
//!
//! - `StreamSession` - One event stream subscription with reconnects
//! - `EventRouter` - Ordered reconciliation of decoded records
//! - `HealthMonitor` - Periodic probing and connection status

mod event_router;
mod health_monitor;
mod stream_session;
mod timer_slot;

pub use event_router::EventRouter;
pub use health_monitor::{HealthMonitor, HealthMonitorConfig};
pub use stream_session::{
    SessionSnapshot, StreamSession, StreamSessionBuilder, DEFAULT_RECONNECT_DELAY,
};
