//! Minimal single-field status patch carried by `frame.status_changed`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{FrameId, ValidationError};

/// Progress status of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Todo,
    InProgress,
    Done,
    Skipped,
}

impl FrameStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameStatus::Todo => "todo",
            FrameStatus::InProgress => "in_progress",
            FrameStatus::Done => "done",
            FrameStatus::Skipped => "skipped",
        }
    }

    /// Returns true if the frame counts towards project completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, FrameStatus::Done | FrameStatus::Skipped)
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FrameStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(FrameStatus::Todo),
            "in_progress" => Ok(FrameStatus::InProgress),
            "done" => Ok(FrameStatus::Done),
            "skipped" => Ok(FrameStatus::Skipped),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// In-place update of one frame's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPatch {
    pub id: FrameId,
    pub status: FrameStatus,
}

#[derive(Deserialize)]
struct RawStatusPatch {
    id: String,
    status: String,
}

impl StatusPatch {
    /// Creates a patch directly.
    pub fn new(id: FrameId, status: FrameStatus) -> Self {
        Self { id, status }
    }

    /// Parses and validates an event payload of the form `{"id": .., "status": ..}`.
    ///
    /// Unknown extra fields are ignored. The status is validated separately
    /// from the JSON shape so that an unknown status is reported as such.
    pub fn parse(payload: &str) -> Result<Self, ValidationError> {
        let raw: RawStatusPatch = serde_json::from_str(payload)
            .map_err(|e| ValidationError::invalid_format("payload", e.to_string()))?;

        if raw.id.trim().is_empty() {
            return Err(ValidationError::empty_field("id"));
        }

        Ok(Self {
            id: FrameId::new(raw.id),
            status: raw.status.parse()?,
        })
    }
}
