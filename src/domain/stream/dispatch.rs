//! Static event dispatch table.
//!
//! Maps an event name to the set of resources that must be reconciled when
//! it arrives. Membership is set-based: one event may belong to several sets
//! and then triggers every matching action.
//!
//! ```text
//! frame.status_changed ──► Frames (or in-place status patch)
//!                      └─► ProjectDetails (completion counts)
//! creative.assigned    ──► Frames
//!                      └─► Creatives
//! ```

use super::status_patch::StatusPatch;

/// Reserved liveness event; flips the connected flag and nothing else.
pub const HANDSHAKE_EVENT: &str = "connected";

/// Event carrying a single-field frame status change.
pub const STATUS_CHANGED_EVENT: &str = "frame.status_changed";

/// Events that invalidate the frame list.
pub const FRAME_EVENTS: &[&str] = &[
    "frame.created",
    "frame.updated",
    "frame.deleted",
    STATUS_CHANGED_EVENT,
    "frames.reordered",
    "creative.assigned",
    "creative.unassigned",
];

/// Events that invalidate the creative list.
pub const CREATIVE_EVENTS: &[&str] = &[
    "creative.created",
    "creative.updated",
    "creative.deleted",
    "creative.assigned",
    "creative.unassigned",
];

/// Events that invalidate project details (schedule and aggregate counts).
pub const PROJECT_DETAIL_EVENTS: &[&str] = &[
    "project.updated",
    "schedule.updated",
    "frame.created",
    "frame.deleted",
    STATUS_CHANGED_EVENT,
];

/// Remote resource that can be refetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Frames,
    Creatives,
    ProjectDetails,
}

impl ResourceKind {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Frames => "frames",
            ResourceKind::Creatives => "creatives",
            ResourceKind::ProjectDetails => "project_details",
        }
    }
}

/// Side effect triggered by an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationAction {
    /// Full refetch of one resource.
    Refetch(ResourceKind),
    /// In-place status update of one frame.
    PatchStatus(StatusPatch),
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Stream liveness marker.
    Handshake,
    /// Actions to execute, in order.
    Reconcile(Vec<ReconciliationAction>),
    /// Event name is not in the table.
    Ignore,
}

/// Immutable event-name to resource mapping.
#[derive(Debug, Clone, Copy)]
pub struct EventDispatchTable {
    frames: &'static [&'static str],
    creatives: &'static [&'static str],
    project_details: &'static [&'static str],
}

/// Table shared by every session.
pub static DISPATCH_TABLE: EventDispatchTable = EventDispatchTable::standard();

impl EventDispatchTable {
    /// The production mapping.
    pub const fn standard() -> Self {
        Self {
            frames: FRAME_EVENTS,
            creatives: CREATIVE_EVENTS,
            project_details: PROJECT_DETAIL_EVENTS,
        }
    }

    /// Resources invalidated by `event_name`, in a fixed order
    /// (frames, creatives, project details).
    pub fn resources_for(&self, event_name: &str) -> Vec<ResourceKind> {
        [
            (self.frames, ResourceKind::Frames),
            (self.creatives, ResourceKind::Creatives),
            (self.project_details, ResourceKind::ProjectDetails),
        ]
        .into_iter()
        .filter(|(names, _)| names.iter().any(|name| *name == event_name))
        .map(|(_, kind)| kind)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_is_not_a_data_event() {
        assert!(DISPATCH_TABLE.resources_for(HANDSHAKE_EVENT).is_empty());
    }

    #[test]
    fn status_change_hits_frames_and_details() {
        assert_eq!(
            DISPATCH_TABLE.resources_for(STATUS_CHANGED_EVENT),
            vec![ResourceKind::Frames, ResourceKind::ProjectDetails]
        );
    }

    #[test]
    fn assignment_hits_frames_and_creatives() {
        assert_eq!(
            DISPATCH_TABLE.resources_for("creative.assigned"),
            vec![ResourceKind::Frames, ResourceKind::Creatives]
        );
    }

    #[test]
    fn schedule_update_hits_details_only() {
        assert_eq!(
            DISPATCH_TABLE.resources_for("schedule.updated"),
            vec![ResourceKind::ProjectDetails]
        );
    }

    #[test]
    fn unknown_event_hits_nothing() {
        assert!(DISPATCH_TABLE.resources_for("message").is_empty());
        assert!(DISPATCH_TABLE.resources_for("user.typing").is_empty());
    }
}
