//! Single-slot one-shot timer for actor loops.

use std::future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, Sleep};

/// Holds at most one pending deadline.
///
/// Meant to be polled from a `tokio::select!` arm via [`TimerSlot::fired`];
/// the slot empties itself once the deadline passes.
#[derive(Debug, Default)]
pub(crate) struct TimerSlot {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TimerSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arms the timer unless one is already pending. Returns true if armed.
    pub(crate) fn arm_if_idle(&mut self, delay: Duration) -> bool {
        if self.sleep.is_some() {
            return false;
        }
        self.sleep = Some(Box::pin(sleep(delay)));
        true
    }

    /// Drops any pending deadline.
    pub(crate) fn cancel(&mut self) {
        self.sleep = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Completes when the pending deadline passes; never completes when idle.
    pub(crate) async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(deadline) => {
                deadline.as_mut().await;
                self.sleep = None;
            }
            None => future::pending::<()>().await,
        }
    }
}
