use bytes::Bytes;
use serde::Serialize;
use sqlx::FromRow;

/// The only status the ingestion pipeline sets.
pub const STATUS_UPLOADED: &str = "uploaded";

/// Metadata record describing a stored blob
///
/// Created once per successful upload, never mutated, removed only on delete.
/// `blob_id` is a non-owning back-reference into the blob store.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub owner_id: String,
    pub blob_id: String,
    pub storage_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_at: String,
    pub status: String,
}

/// A single file lifted out of an upload request. Consumed once by the
/// ingestion pipeline; never persisted in this form.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub file_size: i64,
    pub data: Bytes,
}

/// Successful upload receipt
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub file_id: String,
    pub record_id: String,
    pub file_name: String,
    pub file_size: i64,
    pub uploaded_at: String,
}

/// Per-file failure within a multi-file upload
#[derive(Debug, Serialize)]
pub struct UploadFailure {
    pub file_name: String,
    pub error: String,
}

/// Outcome of a multi-file upload; the batch may partially succeed.
#[derive(Debug, Serialize)]
pub struct UploadBatchResponse {
    pub uploaded: Vec<UploadReceipt>,
    pub failed: Vec<UploadFailure>,
}

/// File list response
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecord>,
}

/// Result of a reconciliation sweep between the two backing stores
#[derive(Debug, Serialize)]
pub struct SweepReport {
    /// Blobs no metadata record points at
    pub orphaned_blobs: Vec<String>,
    /// Blob ids referenced by records whose blob no longer resolves
    pub dangling_records: Vec<String>,
}
