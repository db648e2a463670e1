use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::{classify_status, Result};
use crate::storage::BlobStore;

/// HTTP-backed blob store
///
/// Talks to a remote blob service over a small REST surface. The client and
/// its credentials are constructed once at startup and shared read-only
/// across all requests.
pub struct RemoteBlobStore {
    client: reqwest::Client,
    endpoint: String,
    project: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct BlobIndex {
    ids: Vec<String>,
}

impl RemoteBlobStore {
    pub fn new(
        endpoint: impl Into<String>,
        project: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project: project.into(),
            api_key: api_key.into(),
        }
    }

    fn blob_url(&self, blob_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/blobs/{}",
            self.endpoint, self.project, blob_id
        )
    }

    fn index_url(&self) -> String {
        format!("{}/v1/projects/{}/blobs", self.endpoint, self.project)
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    /// Turn a non-success response into a classified error.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), detail))
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    async fn store(&self, owner_id: &str, blob_id: &str, data: Bytes, name: &str) -> Result<()> {
        let response = self
            .client
            .put(self.blob_url(blob_id))
            .headers(self.auth_headers())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header("x-blob-owner", owner_id)
            .header("x-blob-name", name)
            .body(data)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn fetch(&self, blob_id: &str) -> Result<Bytes> {
        let response = self
            .client
            .get(self.blob_url(blob_id))
            .headers(self.auth_headers())
            .send()
            .await?;

        let response = Self::check(response).await?;
        let data = response.bytes().await?;
        Ok(data)
    }

    async fn delete(&self, blob_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.blob_url(blob_id))
            .headers(self.auth_headers())
            .send()
            .await?;

        // Already gone counts as deleted.
        if response.status().as_u16() == 404 {
            return Ok(());
        }

        Self::check(response).await?;
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.index_url())
            .headers(self.auth_headers())
            .send()
            .await?;

        let response = Self::check(response).await?;
        let index: BlobIndex = response.json().await?;
        Ok(index.ids)
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_building_strips_trailing_slash() {
        let store = RemoteBlobStore::new("https://blobs.example.com/", "proj-1", "key");
        assert_eq!(
            store.blob_url("abc"),
            "https://blobs.example.com/v1/projects/proj-1/blobs/abc"
        );
        assert_eq!(
            store.index_url(),
            "https://blobs.example.com/v1/projects/proj-1/blobs"
        );
    }
}
