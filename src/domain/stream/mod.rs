//! Stream module - decoding and classification of project events.
//!
//! Pure logic only: no I/O and no timers. The application layer feeds bytes
//! through [`FrameDecoder`] and routes the resulting records using the
//! [`EventDispatchTable`].

mod dispatch;
mod event_record;
mod frame_decoder;
mod session_state;
mod status_patch;

pub use dispatch::{
    EventDispatchTable, ReconciliationAction, ResourceKind, RouteDecision, CREATIVE_EVENTS,
    DISPATCH_TABLE, FRAME_EVENTS, HANDSHAKE_EVENT, PROJECT_DETAIL_EVENTS, STATUS_CHANGED_EVENT,
};
pub use event_record::{EventRecord, DEFAULT_EVENT_NAME};
pub use frame_decoder::{extract, FrameDecoder};
pub use session_state::{SessionState, SubscriptionKey};
pub use status_patch::{FrameStatus, StatusPatch};
