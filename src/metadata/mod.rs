pub mod sqlite;

pub use sqlite::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FileRecord;

/// Metadata store gateway
///
/// Narrow capability interface over the document store holding file records,
/// so any compliant backend can be substituted.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Persist a new record, returning its id.
    async fn create(&self, record: &FileRecord) -> Result<String>;

    /// All records for an owner, newest first. Empty for unknown owners.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>>;

    /// Remove every record referencing a blob. Returns the number removed;
    /// zero is not an error.
    async fn delete_by_blob(&self, blob_id: &str) -> Result<u64>;

    /// Blob ids referenced by any record, for reconciliation sweeps.
    async fn list_blob_ids(&self) -> Result<Vec<String>>;
}
