//! Event stream transport over HTTP.
//!
//! Opens `GET {base_url}/projects/{id}/events` with `Accept: text/event-stream`
//! and hands the response body through as raw chunks. The client carries no
//! timeout: a healthy stream may stay silent for a long time.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Client;

use super::join_segments;
use crate::domain::foundation::ProjectId;
use crate::ports::{ByteStream, EventTransport, StreamRequest, TransportError};

/// `EventTransport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestEventTransport {
    client: Client,
    base_url: String,
}

impl ReqwestEventTransport {
    /// Creates a transport with its own client.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::invalid_target(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a transport reusing an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn events_url(&self, project_id: &ProjectId) -> Result<reqwest::Url, TransportError> {
        join_segments(&self.base_url, &["projects", project_id.as_str(), "events"])
            .map_err(TransportError::invalid_target)
    }
}

#[async_trait]
impl EventTransport for ReqwestEventTransport {
    async fn open(&self, request: StreamRequest) -> Result<ByteStream, TransportError> {
        let url = self.events_url(&request.project_id)?;

        let mut builder = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(token) = request.credential() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, 0))?;

        let status = response.status();
        match status.as_u16() {
            401 | 403 => {
                return Err(TransportError::Unauthorized {
                    status: status.as_u16(),
                })
            }
            _ if !status.is_success() => {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        tracing::debug!(project_id = %request.project_id, "event stream opened");

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::stream(e.to_string())));

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_url_is_project_scoped() {
        let transport = ReqwestEventTransport::with_client(Client::new(), "https://stream.example.com");
        let url = transport
            .events_url(&ProjectId::new("proj-9").unwrap())
            .unwrap();
        assert_eq!(url.as_str(), "https://stream.example.com/projects/proj-9/events");
    }

    #[test]
    fn invalid_base_url_is_reported_as_invalid_target() {
        let transport = ReqwestEventTransport::with_client(Client::new(), "::nope::");
        let err = transport
            .events_url(&ProjectId::new("p").unwrap())
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidTarget(_)));
    }
}
