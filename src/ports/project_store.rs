//! Project Store Port - the external data store kept in sync by the stream.
//!
//! The store owns the local copies of frames, creatives and project details
//! and knows how to fetch them. Fetches are idempotent and safe to call
//! repeatedly; the event router treats them as fire-and-forget.

use async_trait::async_trait;

use crate::domain::stream::{ResourceKind, StatusPatch};

/// Port for the collaborator that fetches and holds project data.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Refetches the frame list.
    async fn fetch_frames(&self) -> Result<(), FetchError>;

    /// Refetches the creative list.
    async fn fetch_creatives(&self) -> Result<(), FetchError>;

    /// Refetches project details (schedule and aggregate counts).
    async fn fetch_project_details(&self) -> Result<(), FetchError>;

    /// Applies a status patch to the matching local frame.
    ///
    /// Returns `false` if no local frame has the patched id.
    async fn apply_status_patch(&self, patch: &StatusPatch) -> bool;

    /// Refetches the given resource.
    async fn refetch(&self, kind: ResourceKind) -> Result<(), FetchError> {
        match kind {
            ResourceKind::Frames => self.fetch_frames().await,
            ResourceKind::Creatives => self.fetch_creatives().await,
            ResourceKind::ProjectDetails => self.fetch_project_details().await,
        }
    }
}

/// Errors surfaced by collaborator fetches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Credential rejected; the collaborator handles re-authentication.
    #[error("unauthorized")]
    Unauthorized,

    /// Network failure while fetching.
    #[error("network error: {0}")]
    Network(String),

    /// Response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No project is selected yet.
    #[error("no project selected")]
    NotConfigured,
}

impl FetchError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}
