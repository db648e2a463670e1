use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::BlobStore;

/// Local file system blob store
///
/// Blobs live as flat files named by their identifier. There is no per-owner
/// permission model on disk; access control is enforced by the serving layer.
pub struct LocalBlobStore {
    base_path: PathBuf,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn blob_path(&self, blob_id: &str) -> PathBuf {
        self.base_path.join(blob_id)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, owner_id: &str, blob_id: &str, data: Bytes, name: &str) -> Result<()> {
        let full_path = self.blob_path(blob_id);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!(
            "Stored blob {} ({} bytes) as {} for {}",
            blob_id,
            data.len(),
            name,
            owner_id
        );
        Ok(())
    }

    async fn fetch(&self, blob_id: &str) -> Result<Bytes> {
        let full_path = self.blob_path(blob_id);

        let data = fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("Blob not found: {}", blob_id))
            } else {
                AppError::Internal(format!("Failed to read blob {}: {}", blob_id, e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    async fn delete(&self, blob_id: &str) -> Result<()> {
        let full_path = self.blob_path(blob_id);

        if full_path.exists() {
            fs::remove_file(&full_path).await?;
            tracing::debug!("Deleted blob {}", blob_id);
        }

        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }

        Ok(ids)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_fetch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let payload = Bytes::from_static(b"a,b\n1,2\n");
        store
            .store("u1", "blob-1", payload.clone(), "u1_0_data.csv")
            .await
            .unwrap();

        let fetched = store.fetch("blob-1").await.unwrap();
        assert_eq!(fetched, payload);
    }

    #[tokio::test]
    async fn fetch_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let err = store.fetch("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store
            .store("u1", "blob-1", Bytes::from_static(b"x"), "u1_0_x.csv")
            .await
            .unwrap();

        store.delete("blob-1").await.unwrap();
        store.delete("blob-1").await.unwrap();
        store.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn list_ids_reflects_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        assert!(store.list_ids().await.unwrap().is_empty());

        store
            .store("u1", "blob-1", Bytes::from_static(b"x"), "u1_0_x.csv")
            .await
            .unwrap();
        store
            .store("u1", "blob-2", Bytes::from_static(b"y"), "u1_0_y.csv")
            .await
            .unwrap();

        let mut ids = store.list_ids().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["blob-1".to_string(), "blob-2".to_string()]);
    }

    #[tokio::test]
    async fn list_ids_on_missing_base_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("not-created-yet"));
        assert!(store.list_ids().await.unwrap().is_empty());
    }
}
