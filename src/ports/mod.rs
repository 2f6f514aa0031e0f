//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the synchronization core and its collaborators. Adapters implement them.
//!
//! - `EventTransport` - Opens the long-lived event stream
//! - `ConnectivityProbe` - Cheap reachability check for the health monitor
//! - `ProjectStore` - Fetches and holds frames, creatives and project details
//! - `CredentialProvider` - Supplies the bearer credential per connection attempt
//! - `HealthReporter` - Receives hard connectivity failures seen by the stream

mod connectivity_probe;
mod credential_provider;
mod event_transport;
mod health_reporter;
mod project_store;

pub use connectivity_probe::ConnectivityProbe;
pub use credential_provider::CredentialProvider;
pub use event_transport::{ByteStream, EventTransport, StreamRequest, TransportError};
pub use health_reporter::HealthReporter;
pub use project_store::{FetchError, ProjectStore};
