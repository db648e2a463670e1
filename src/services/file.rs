use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::metadata::MetadataStore;
use crate::models::{FileRecord, UploadReceipt, UploadRequest, STATUS_UPLOADED};
use crate::retry::{with_retry, RetryPolicy};
use crate::services::validation;
use crate::storage::BlobStore;

/// File service: the ingestion pipeline plus listing, retrieval, and deletion
/// over the two backing stores.
pub struct FileService;

impl FileService {
    /// Ingest one file: validate, store the payload, then record its metadata.
    ///
    /// The two writes are not transactional. A blob-store failure leaves no
    /// trace; a metadata failure after the blob write leaves an orphaned blob
    /// behind, which is logged and left for out-of-band reconciliation rather
    /// than rolled back.
    pub async fn upload_file(
        storage: &dyn BlobStore,
        metadata: &dyn MetadataStore,
        owner_id: &str,
        req: UploadRequest,
    ) -> Result<UploadReceipt> {
        validation::validate_upload(&req)?;

        let blob_id = Uuid::new_v4().to_string();
        let storage_name = format!(
            "{}_{}_{}",
            owner_id,
            Utc::now().timestamp_millis(),
            req.file_name
        );

        tracing::info!("Uploading {} ({} bytes)", storage_name, req.file_size);

        with_retry(RetryPolicy::BLOB_WRITE, "store blob", || {
            storage.store(owner_id, &blob_id, req.data.clone(), &storage_name)
        })
        .await?;

        tracing::info!("Blob {} stored", blob_id);

        let record = FileRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            blob_id: blob_id.clone(),
            storage_name,
            original_name: req.file_name.clone(),
            file_size: req.file_size,
            content_type: req
                .content_type
                .clone()
                .unwrap_or_else(|| validation::CSV_CONTENT_TYPE.to_string()),
            uploaded_at: Utc::now().to_rfc3339(),
            status: STATUS_UPLOADED.to_string(),
        };

        let record_id = with_retry(RetryPolicy::METADATA_WRITE, "create metadata record", || {
            metadata.create(&record)
        })
        .await
        .map_err(|e| {
            tracing::error!("Metadata write failed, blob {} is now orphaned: {}", blob_id, e);
            AppError::Internal(
                "File was stored but its record could not be saved. Please try again later."
                    .to_string(),
            )
        })?;

        Ok(UploadReceipt {
            file_id: blob_id,
            record_id,
            file_name: req.file_name,
            file_size: req.file_size,
            uploaded_at: record.uploaded_at.clone(),
        })
    }

    /// All records owned by a caller, newest first.
    pub async fn list_files(
        metadata: &dyn MetadataStore,
        owner_id: &str,
    ) -> Result<Vec<FileRecord>> {
        with_retry(RetryPolicy::LIST, "list records", || {
            metadata.list_by_owner(owner_id)
        })
        .await
    }

    /// Fetch a blob and decode it as UTF-8 text for preview.
    ///
    /// The identifier is the capability; ownership beyond authentication is
    /// the blob store's concern.
    pub async fn read_file_text(storage: &dyn BlobStore, blob_id: &str) -> Result<String> {
        if blob_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Missing file id".to_string()));
        }

        let data = storage.fetch(blob_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::NotFound("File not found or empty".to_string()),
            other => other,
        })?;

        if data.is_empty() {
            return Err(AppError::NotFound("File not found or empty".to_string()));
        }

        String::from_utf8(data.to_vec())
            .map_err(|_| AppError::Decode("File content is not valid UTF-8 text".to_string()))
    }

    /// Remove a blob and its metadata record(s). Absence on either side is
    /// success, so a repeated delete cannot fail.
    pub async fn delete_file(
        storage: &dyn BlobStore,
        metadata: &dyn MetadataStore,
        blob_id: &str,
    ) -> Result<()> {
        if blob_id.trim().is_empty() {
            return Err(AppError::InvalidInput("Missing file id".to_string()));
        }

        match with_retry(RetryPolicy::DELETE, "delete blob", || storage.delete(blob_id)).await {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => {}
            Err(e) => {
                return Err(AppError::Internal(format!("Failed to delete file: {}", e)));
            }
        }

        let removed = with_retry(RetryPolicy::DELETE, "delete metadata records", || {
            metadata.delete_by_blob(blob_id)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Failed to delete file record: {}", e)))?;

        if removed == 0 {
            tracing::debug!("No metadata records for blob {}", blob_id);
        }

        Ok(())
    }
}
