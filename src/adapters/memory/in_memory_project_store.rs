//! In-memory ProjectStore for tests and local runs.
//!
//! Records every call in order so tests can assert on the exact sequence of
//! reconciliation side effects.
//!
//! # Panics
//!
//! Methods panic if an internal lock is poisoned. This adapter is meant for
//! tests; production code uses `HttpProjectStore`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::FrameId;
use crate::domain::stream::{FrameStatus, ResourceKind, StatusPatch};
use crate::ports::{FetchError, ProjectStore};

/// One recorded interaction with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// A refetch was started.
    Fetch(ResourceKind),
    /// A status patch was applied (or matched nothing).
    Patch {
        id: FrameId,
        status: FrameStatus,
        matched: bool,
    },
}

/// Store keeping frame statuses in memory with scripted fetch behavior.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    frames: Mutex<HashMap<FrameId, FrameStatus>>,
    calls: Mutex<Vec<StoreCall>>,
    completed: Mutex<Vec<ResourceKind>>,
    failures: HashMap<ResourceKind, FetchError>,
    delays: HashMap<ResourceKind, Duration>,
}

impl InMemoryProjectStore {
    /// Creates an empty store whose fetches succeed immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a frame.
    pub fn with_frame(self, id: impl Into<String>, status: FrameStatus) -> Self {
        self.frames
            .lock()
            .unwrap()
            .insert(FrameId::new(id), status);
        self
    }

    /// Makes every fetch of `kind` fail with `error`.
    pub fn failing(mut self, kind: ResourceKind, error: FetchError) -> Self {
        self.failures.insert(kind, error);
        self
    }

    /// Makes every fetch of `kind` take `delay`.
    pub fn with_delay(mut self, kind: ResourceKind, delay: Duration) -> Self {
        self.delays.insert(kind, delay);
        self
    }

    /// All calls, in the order they started.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Fetches in the order they finished.
    pub fn completed_fetches(&self) -> Vec<ResourceKind> {
        self.completed.lock().unwrap().clone()
    }

    /// Number of fetches started for `kind`.
    pub fn fetch_count(&self, kind: ResourceKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == StoreCall::Fetch(kind))
            .count()
    }

    /// Current status of a frame.
    pub fn frame_status(&self, id: &FrameId) -> Option<FrameStatus> {
        self.frames.lock().unwrap().get(id).copied()
    }

    /// Clears the call journal.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.completed.lock().unwrap().clear();
    }

    async fn fetch(&self, kind: ResourceKind) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(StoreCall::Fetch(kind));

        if let Some(delay) = self.delays.get(&kind) {
            sleep(*delay).await;
        }

        self.completed.lock().unwrap().push(kind);
        match self.failures.get(&kind) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn fetch_frames(&self) -> Result<(), FetchError> {
        self.fetch(ResourceKind::Frames).await
    }

    async fn fetch_creatives(&self) -> Result<(), FetchError> {
        self.fetch(ResourceKind::Creatives).await
    }

    async fn fetch_project_details(&self) -> Result<(), FetchError> {
        self.fetch(ResourceKind::ProjectDetails).await
    }

    async fn apply_status_patch(&self, patch: &StatusPatch) -> bool {
        let matched = match self.frames.lock().unwrap().get_mut(&patch.id) {
            Some(status) => {
                *status = patch.status;
                true
            }
            None => false,
        };

        self.calls.lock().unwrap().push(StoreCall::Patch {
            id: patch.id.clone(),
            status: patch.status,
            matched,
        });
        matched
    }
}
