//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the synchronization core to external systems:
//! - `http` - reqwest-backed transport, probe and project store
//! - `memory` - In-memory and scripted implementations for tests and demos

pub mod http;
pub mod memory;

pub use http::{HttpProjectStore, ReqwestConnectivityProbe, ReqwestEventTransport};
pub use memory::{
    InMemoryProjectStore, MockConnectivityProbe, MockEventTransport, StaticCredentialProvider,
    OpenGate, StreamFeed,
};
