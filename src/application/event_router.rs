//! Event Router - turns decoded records into reconciliation work.
//!
//! Classification is synchronous and happens on the caller's task. The
//! resulting actions go into a FIFO queue drained by one worker task, so
//! side effects run strictly in the order records were routed, even when
//! several callers route concurrently. Fetch failures are logged and
//! swallowed: the next event or the next reconnect retries naturally.
//!
//! ```text
//! route(record) ──► classify ──► [actions] ──► queue ──► worker ──► ProjectStore
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::domain::stream::{
    EventDispatchTable, EventRecord, ReconciliationAction, ResourceKind, RouteDecision,
    StatusPatch, DISPATCH_TABLE, HANDSHAKE_EVENT, STATUS_CHANGED_EVENT,
};
use crate::ports::ProjectStore;

enum WorkItem {
    Action(ReconciliationAction),
    Flush(oneshot::Sender<()>),
}

/// Routes event records to the project store.
///
/// Must be created inside a Tokio runtime; the worker stops once the router
/// is dropped and its queue is drained.
pub struct EventRouter {
    table: &'static EventDispatchTable,
    queue: mpsc::UnboundedSender<WorkItem>,
}

impl EventRouter {
    /// Creates a router over the standard dispatch table.
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self::with_table(store, &DISPATCH_TABLE)
    }

    /// Creates a router over a custom dispatch table.
    pub fn with_table(store: Arc<dyn ProjectStore>, table: &'static EventDispatchTable) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        tokio::spawn(ReconciliationWorker { store, receiver }.run());
        Self { table, queue }
    }

    /// Classifies a record without side effects.
    ///
    /// For the status-change event the payload is tried as a status patch;
    /// on success the frame refetch is replaced by an in-place patch while
    /// the other actions (the aggregate refetch) are kept.
    pub fn classify(&self, record: &EventRecord) -> RouteDecision {
        if record.name == HANDSHAKE_EVENT {
            return RouteDecision::Handshake;
        }

        let resources = self.table.resources_for(&record.name);
        if resources.is_empty() {
            return RouteDecision::Ignore;
        }

        let patch = if record.name == STATUS_CHANGED_EVENT {
            parse_status_patch(record)
        } else {
            None
        };

        let actions = resources
            .into_iter()
            .map(|kind| match (kind, &patch) {
                (ResourceKind::Frames, Some(patch)) => ReconciliationAction::PatchStatus(patch.clone()),
                (kind, _) => ReconciliationAction::Refetch(kind),
            })
            .collect();

        RouteDecision::Reconcile(actions)
    }

    /// Classifies a record and queues its actions. Returns the decision.
    pub fn route(&self, record: &EventRecord) -> RouteDecision {
        let decision = self.classify(record);

        match &decision {
            RouteDecision::Reconcile(actions) => {
                debug!(event = %record.name, actions = actions.len(), "Routing event");
                for action in actions {
                    if self.queue.send(WorkItem::Action(action.clone())).is_err() {
                        warn!(event = %record.name, "Reconciliation worker stopped; dropping action");
                        break;
                    }
                }
            }
            RouteDecision::Handshake => debug!("Stream handshake received"),
            RouteDecision::Ignore => debug!(event = %record.name, "Ignoring unmapped event"),
        }

        decision
    }

    /// Waits until every action queued before this call has been executed.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.queue.send(WorkItem::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

fn parse_status_patch(record: &EventRecord) -> Option<StatusPatch> {
    match StatusPatch::parse(&record.data()) {
        Ok(patch) => Some(patch),
        Err(e) => {
            warn!(event = %record.name, error = %e, "Unusable status patch; falling back to refetch");
            None
        }
    }
}

struct ReconciliationWorker {
    store: Arc<dyn ProjectStore>,
    receiver: mpsc::UnboundedReceiver<WorkItem>,
}

impl ReconciliationWorker {
    async fn run(mut self) {
        while let Some(item) = self.receiver.recv().await {
            match item {
                WorkItem::Action(action) => self.execute(action).await,
                WorkItem::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Reconciliation worker stopped");
    }

    async fn execute(&self, action: ReconciliationAction) {
        match action {
            ReconciliationAction::Refetch(kind) => match self.store.refetch(kind).await {
                Ok(()) => debug!(resource = kind.as_str(), "Refetched"),
                Err(e) => warn!(resource = kind.as_str(), error = %e, "Refetch failed"),
            },
            ReconciliationAction::PatchStatus(patch) => {
                if self.store.apply_status_patch(&patch).await {
                    debug!(frame_id = %patch.id, status = %patch.status, "Applied status patch");
                } else {
                    debug!(frame_id = %patch.id, "Status patch matched no local frame");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryProjectStore, StoreCall};
    use crate::domain::foundation::FrameId;
    use crate::domain::stream::FrameStatus;
    use crate::ports::FetchError;
    use std::time::Duration;

    fn router(store: &Arc<InMemoryProjectStore>) -> EventRouter {
        EventRouter::new(store.clone())
    }

    fn status_event(payload: &str) -> EventRecord {
        EventRecord::with_data(STATUS_CHANGED_EVENT, payload)
    }

    #[tokio::test]
    async fn handshake_triggers_no_fetch() {
        let store = Arc::new(InMemoryProjectStore::new());
        let router = router(&store);

        let decision = router.route(&EventRecord::new(HANDSHAKE_EVENT, vec![]));
        router.flush().await;

        assert_eq!(decision, RouteDecision::Handshake);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_event_is_ignored() {
        let store = Arc::new(InMemoryProjectStore::new());
        let router = router(&store);

        assert_eq!(router.route(&EventRecord::default()), RouteDecision::Ignore);
        router.flush().await;
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn one_event_can_trigger_several_refetches() {
        let store = Arc::new(InMemoryProjectStore::new());
        let router = router(&store);

        router.route(&EventRecord::with_data("creative.assigned", "{}"));
        router.flush().await;

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Fetch(ResourceKind::Frames),
                StoreCall::Fetch(ResourceKind::Creatives),
            ]
        );
    }

    #[tokio::test]
    async fn valid_status_patch_replaces_frame_refetch() {
        let store = Arc::new(InMemoryProjectStore::new().with_frame("f1", FrameStatus::Todo));
        let router = router(&store);

        router.route(&status_event(r#"{"id":"f1","status":"done"}"#));
        router.flush().await;

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Patch {
                    id: FrameId::new("f1"),
                    status: FrameStatus::Done,
                    matched: true,
                },
                StoreCall::Fetch(ResourceKind::ProjectDetails),
            ]
        );
        assert_eq!(store.frame_status(&FrameId::new("f1")), Some(FrameStatus::Done));
    }

    #[tokio::test]
    async fn status_patch_for_unknown_id_still_refetches_aggregate() {
        let store = Arc::new(InMemoryProjectStore::new().with_frame("f1", FrameStatus::Todo));
        let router = router(&store);

        router.route(&status_event(r#"{"id":"ghost","status":"done"}"#));
        router.flush().await;

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Patch {
                    id: FrameId::new("ghost"),
                    status: FrameStatus::Done,
                    matched: false,
                },
                StoreCall::Fetch(ResourceKind::ProjectDetails),
            ]
        );
        assert_eq!(store.frame_status(&FrameId::new("f1")), Some(FrameStatus::Todo));
    }

    #[tokio::test]
    async fn invalid_status_patch_falls_back_to_full_refetch() {
        let store = Arc::new(InMemoryProjectStore::new());
        let router = router(&store);

        router.route(&status_event(r#"{"id":"f1","status":"archived"}"#));
        router.route(&status_event("garbage"));
        router.flush().await;

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Fetch(ResourceKind::Frames),
                StoreCall::Fetch(ResourceKind::ProjectDetails),
                StoreCall::Fetch(ResourceKind::Frames),
                StoreCall::Fetch(ResourceKind::ProjectDetails),
            ]
        );
    }

    #[tokio::test]
    async fn fetch_failures_are_swallowed() {
        let store = Arc::new(
            InMemoryProjectStore::new()
                .failing(ResourceKind::Frames, FetchError::network("offline")),
        );
        let router = router(&store);

        router.route(&EventRecord::with_data("frame.updated", "{}"));
        router.route(&EventRecord::with_data("creative.updated", "{}"));
        router.flush().await;

        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Fetch(ResourceKind::Frames),
                StoreCall::Fetch(ResourceKind::Creatives),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn side_effects_keep_routing_order_despite_slow_fetches() {
        let store = Arc::new(
            InMemoryProjectStore::new()
                .with_delay(ResourceKind::Frames, Duration::from_millis(300))
                .with_delay(ResourceKind::Creatives, Duration::from_millis(100)),
        );
        let router = router(&store);

        for name in ["frame.updated", "creative.updated", "schedule.updated"] {
            router.route(&EventRecord::with_data(name, "{}"));
        }
        router.flush().await;

        assert_eq!(
            store.completed_fetches(),
            vec![
                ResourceKind::Frames,
                ResourceKind::Creatives,
                ResourceKind::ProjectDetails,
            ]
        );
    }
}
