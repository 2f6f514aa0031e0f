//! Mock ConnectivityProbe for testing.
//!
//! Returns scripted outcomes in order, then a configurable default.
//! An optional per-probe delay simulates slow networks for timeout tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ConnectivityProbe, TransportError};

/// Scripted probe.
#[derive(Debug)]
pub struct MockConnectivityProbe {
    outcomes: Mutex<VecDeque<Result<(), TransportError>>>,
    fallback: Result<(), TransportError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl Default for MockConnectivityProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnectivityProbe {
    /// Creates a probe that always succeeds.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Ok(()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a probe returning `outcomes` in order, then successes.
    pub fn scripted(outcomes: impl IntoIterator<Item = Result<(), TransportError>>) -> Self {
        let probe = Self::new();
        probe.outcomes.lock().unwrap().extend(outcomes);
        probe
    }

    /// Sets the outcome used once the script runs out.
    pub fn with_fallback(mut self, fallback: Result<(), TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets simulated latency per probe.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of probes performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectivityProbe for MockConnectivityProbe {
    async fn probe(&self) -> Result<(), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}
