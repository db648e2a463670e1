use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Blob store gateway trait
///
/// Backends hold opaque payloads addressed by caller-generated identifiers.
/// Owner scoping beyond the identifier is up to the backend's own permission
/// model; callers authenticate before identifiers are handed out.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a payload under an identifier, scoped to an owner.
    async fn store(&self, owner_id: &str, blob_id: &str, data: Bytes, name: &str) -> Result<()>;

    /// Fetch a payload by identifier.
    async fn fetch(&self, blob_id: &str) -> Result<Bytes>;

    /// Delete a payload. Deleting an absent blob is not an error.
    async fn delete(&self, blob_id: &str) -> Result<()>;

    /// Identifiers of every stored blob, for reconciliation sweeps.
    async fn list_ids(&self) -> Result<Vec<String>>;

    /// Backend name
    fn backend(&self) -> &'static str;
}
