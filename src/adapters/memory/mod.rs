//! In-memory and scripted adapters.
//!
//! - `InMemoryProjectStore` - Call-recording store for router tests
//! - `StaticCredentialProvider` - Replaceable credential value
//! - `MockEventTransport` - Scripted connection attempts fed by `StreamFeed`,
//!   optionally held open by an `OpenGate`
//! - `MockConnectivityProbe` - Scripted probe outcomes

mod in_memory_project_store;
mod mock_connectivity_probe;
mod mock_event_transport;
mod static_credential_provider;

pub use in_memory_project_store::{InMemoryProjectStore, StoreCall};
pub use mock_connectivity_probe::MockConnectivityProbe;
pub use mock_event_transport::{MockEventTransport, OpenGate, StreamFeed};
pub use static_credential_provider::StaticCredentialProvider;
