//! Event Transport Port - Interface for opening long-lived event streams.
//!
//! The stream session never talks to the network directly: it asks an
//! `EventTransport` to open a stream for a project and receives raw byte
//! chunks in arrival order. Framing is the session's job, not the transport's.
//!
//! # Example
//!
//! ```ignore
//! let request = StreamRequest::new(project_id, Some(token));
//! let mut stream = transport.open(request).await?;
//! while let Some(chunk) = stream.next().await {
//!     decoder.push(&chunk?);
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use secrecy::{ExposeSecret, Secret};
use std::pin::Pin;

use crate::domain::foundation::ProjectId;

/// Boxed stream of raw chunks from an open connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Port for opening an event stream.
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// Opens one streaming connection.
    ///
    /// Resolves once the remote side accepted the request; the returned
    /// stream then yields chunks until the connection ends. No client-side
    /// timeout applies to either step.
    async fn open(&self, request: StreamRequest) -> Result<ByteStream, TransportError>;
}

/// Parameters of one connection attempt.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Project whose events are requested.
    pub project_id: ProjectId,
    /// Bearer credential, read fresh for this attempt.
    credential: Option<Secret<String>>,
}

impl StreamRequest {
    /// Creates a request for `project_id`.
    pub fn new(project_id: ProjectId, credential: Option<String>) -> Self {
        Self {
            project_id,
            credential: credential.map(Secret::new),
        }
    }

    /// Credential to send as `Authorization: Bearer ...`, if any.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.expose_secret().as_str())
    }
}

/// Transport-level errors. All of them are recoverable by retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request or probe did not complete in time.
    #[error("timed out after {timeout_secs}s")]
    Timeout {
        /// Applied timeout.
        timeout_secs: u64,
    },

    /// No connection could be established (refused, DNS, no route, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server rejected the credential.
    #[error("unauthorized (status {status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
    },

    /// The server answered with an unexpected status.
    #[error("unexpected status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The request target could not be built.
    #[error("invalid request target: {0}")]
    InvalidTarget(String),

    /// The connection broke while streaming.
    #[error("stream error: {0}")]
    Stream(String),
}

impl TransportError {
    /// Creates a connection error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect(message.into())
    }

    /// Creates a mid-stream error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Creates an invalid target error.
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget(message.into())
    }

    /// Returns true for connectivity-class errors (no route, DNS, timeout)
    /// that justify marking the network offline immediately.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connect(_))
    }

    /// Maps a reqwest error, using `timeout_secs` for timeouts.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else if err.is_connect() {
            Self::connect(err.to_string())
        } else if err.is_builder() {
            Self::invalid_target(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
            }
        } else {
            Self::stream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_errors_are_classified() {
        assert!(TransportError::Timeout { timeout_secs: 7 }.is_connectivity());
        assert!(TransportError::connect("dns").is_connectivity());
        assert!(!TransportError::Unauthorized { status: 401 }.is_connectivity());
        assert!(!TransportError::Status { status: 502 }.is_connectivity());
        assert!(!TransportError::stream("reset").is_connectivity());
        assert!(!TransportError::invalid_target("bad").is_connectivity());
    }

    #[test]
    fn request_exposes_credential() {
        let request = StreamRequest::new(ProjectId::new("p").unwrap(), Some("tok".into()));
        assert_eq!(request.credential(), Some("tok"));
        assert!(!format!("{:?}", request).contains("tok"));
    }

    #[test]
    fn error_messages_are_readable() {
        assert_eq!(
            TransportError::Timeout { timeout_secs: 7 }.to_string(),
            "timed out after 7s"
        );
        assert_eq!(
            TransportError::Status { status: 503 }.to_string(),
            "unexpected status 503"
        );
    }
}
