//! Connectivity probe issuing a HEAD request.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use std::time::Duration;

use crate::ports::{ConnectivityProbe, TransportError};

/// Probes a stable endpoint. Any answer below 500 counts as reachable:
/// the question is whether the network works, not whether the endpoint likes us.
#[derive(Debug, Clone)]
pub struct ReqwestConnectivityProbe {
    client: Client,
    url: String,
    timeout: Duration,
}

impl ReqwestConnectivityProbe {
    /// Creates a probe for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::invalid_target(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl ConnectivityProbe for ReqwestConnectivityProbe {
    async fn probe(&self) -> Result<(), TransportError> {
        let response = self
            .client
            .head(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, self.timeout.as_secs()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
