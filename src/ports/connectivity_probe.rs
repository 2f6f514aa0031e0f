//! Connectivity Probe Port - lightweight reachability check.

use async_trait::async_trait;

use super::TransportError;

/// Port for a cheap request used solely to judge connectivity.
///
/// The health monitor wraps every call in its own timeout, so
/// implementations do not need to enforce one.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Performs one probe. `Ok` means the network is reachable.
    async fn probe(&self) -> Result<(), TransportError>;
}
