//! REST-backed project store.
//!
//! Holds the latest frames, creatives and project details for the selected
//! project. Each fetch performs its request without holding any lock and only
//! swaps the decoded result in afterwards, so a slow fetch never blocks
//! readers or status patches.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::join_segments;
use crate::domain::foundation::{FrameId, ProjectId};
use crate::domain::stream::{FrameStatus, StatusPatch};
use crate::ports::{CredentialProvider, FetchError, ProjectStore};

/// A frame as served by the API. Fields beyond id and status are kept
/// verbatim so they survive status patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub id: FrameId,
    pub status: FrameStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Local copy of one project's data.
#[derive(Debug, Clone, Default)]
pub struct ProjectData {
    pub frames: Vec<Frame>,
    pub creatives: Vec<Value>,
    pub details: Option<Value>,
}

/// `ProjectStore` reading from `{base_url}/projects/{id}/...`.
pub struct HttpProjectStore {
    client: Client,
    base_url: String,
    credentials: Option<Arc<dyn CredentialProvider>>,
    project: RwLock<Option<ProjectId>>,
    data: RwLock<ProjectData>,
}

impl HttpProjectStore {
    /// Creates a store with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            credentials: None,
            project: RwLock::new(None),
            data: RwLock::new(ProjectData::default()),
        })
    }

    /// Sends `Authorization: Bearer` with the provider's current credential.
    pub fn with_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Switches the selected project, discarding data of the previous one.
    pub async fn select_project(&self, project_id: Option<ProjectId>) {
        let mut project = self.project.write().await;
        if *project != project_id {
            *project = project_id;
            *self.data.write().await = ProjectData::default();
        }
    }

    /// Snapshot of the current local data.
    pub async fn snapshot(&self) -> ProjectData {
        self.data.read().await.clone()
    }

    /// Current local frames.
    pub async fn frames(&self) -> Vec<Frame> {
        self.data.read().await.frames.clone()
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: &str) -> Result<(ProjectId, T), FetchError> {
        let project_id = self
            .project
            .read()
            .await
            .clone()
            .ok_or(FetchError::NotConfigured)?;

        let url = join_segments(&self.base_url, &["projects", project_id.as_str(), resource])
            .map_err(FetchError::network)?;

        let mut request = self.client.get(url);
        if let Some(token) = self.credentials.as_ref().and_then(|c| c.current_credential()) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::network(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(FetchError::Unauthorized),
            status if !status.is_success() => {
                return Err(FetchError::network(format!("{} returned {}", resource, status)))
            }
            _ => {}
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| FetchError::decode(e.to_string()))?;

        Ok((project_id, body))
    }

    /// Stores `apply`'s result unless the selected project changed meanwhile.
    async fn commit(&self, fetched_for: &ProjectId, apply: impl FnOnce(&mut ProjectData)) {
        let project = self.project.read().await;
        if project.as_ref() != Some(fetched_for) {
            tracing::debug!(project_id = %fetched_for, "discarding fetch for deselected project");
            return;
        }
        apply(&mut *self.data.write().await);
    }
}

#[async_trait]
impl ProjectStore for HttpProjectStore {
    async fn fetch_frames(&self) -> Result<(), FetchError> {
        let (project_id, frames) = self.get_json::<Vec<Frame>>("frames").await?;
        tracing::debug!(project_id = %project_id, count = frames.len(), "frames fetched");
        self.commit(&project_id, |data| data.frames = frames).await;
        Ok(())
    }

    async fn fetch_creatives(&self) -> Result<(), FetchError> {
        let (project_id, creatives) = self.get_json::<Vec<Value>>("creatives").await?;
        tracing::debug!(project_id = %project_id, count = creatives.len(), "creatives fetched");
        self.commit(&project_id, |data| data.creatives = creatives).await;
        Ok(())
    }

    async fn fetch_project_details(&self) -> Result<(), FetchError> {
        let (project_id, details) = self.get_json::<Value>("details").await?;
        self.commit(&project_id, |data| data.details = Some(details)).await;
        Ok(())
    }

    async fn apply_status_patch(&self, patch: &StatusPatch) -> bool {
        let mut data = self.data.write().await;
        match data.frames.iter_mut().find(|frame| frame.id == patch.id) {
            Some(frame) => {
                frame.status = patch.status;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_keeps_unknown_fields() {
        let frame: Frame = serde_json::from_str(
            r#"{"id":"f1","status":"todo","title":"Opening shot","position":3}"#,
        )
        .unwrap();
        assert_eq!(frame.id, FrameId::new("f1"));
        assert_eq!(frame.status, FrameStatus::Todo);
        assert_eq!(frame.extra.get("title"), Some(&Value::from("Opening shot")));
        assert_eq!(frame.extra.get("position"), Some(&Value::from(3)));
    }

    #[tokio::test]
    async fn fetch_without_project_is_not_configured() {
        let store = HttpProjectStore::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        assert_eq!(store.fetch_frames().await, Err(FetchError::NotConfigured));
    }

    #[tokio::test]
    async fn patch_on_empty_store_matches_nothing() {
        let store = HttpProjectStore::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let patch = StatusPatch::new(FrameId::new("f1"), FrameStatus::Done);
        assert!(!store.apply_status_patch(&patch).await);
    }
}
