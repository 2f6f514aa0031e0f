//! Health Reporter Port - out-of-band connectivity failure signal.

/// Receives connectivity-class failures observed outside the probe loop.
///
/// The stream session calls this when its transport fails with an error
/// that already proves the network is down (no route, DNS, timeout).
pub trait HealthReporter: Send + Sync {
    /// Forces the health status to `Offline`.
    fn report_hard_failure(&self);
}
