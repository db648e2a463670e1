use std::collections::HashSet;

use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::models::SweepReport;
use crate::storage::BlobStore;

/// Out-of-band reconciliation between the two backing stores.
///
/// The ingestion pipeline fails forward: a metadata write that dies after the
/// blob write leaves an orphaned blob behind. This sweep finds those, plus
/// records whose blob no longer resolves. Detection only; nothing is
/// repaired or deleted here.
pub struct MaintenanceService;

impl MaintenanceService {
    /// Compare blob store contents against metadata records.
    pub async fn sweep(
        storage: &dyn BlobStore,
        metadata: &dyn MetadataStore,
    ) -> Result<SweepReport> {
        let stored: HashSet<String> = storage.list_ids().await?.into_iter().collect();
        let referenced: HashSet<String> = metadata.list_blob_ids().await?.into_iter().collect();

        let mut orphaned_blobs: Vec<String> = stored.difference(&referenced).cloned().collect();
        let mut dangling_records: Vec<String> = referenced.difference(&stored).cloned().collect();
        orphaned_blobs.sort();
        dangling_records.sort();

        if !orphaned_blobs.is_empty() || !dangling_records.is_empty() {
            tracing::warn!(
                "Sweep found {} orphaned blobs and {} dangling records",
                orphaned_blobs.len(),
                dangling_records.len()
            );
        }

        Ok(SweepReport {
            orphaned_blobs,
            dangling_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::metadata::SqliteMetadataStore;
    use crate::models::{FileRecord, STATUS_UPLOADED};
    use crate::storage::LocalBlobStore;
    use bytes::Bytes;

    fn record(blob_id: &str) -> FileRecord {
        FileRecord {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: "u1".to_string(),
            blob_id: blob_id.to_string(),
            storage_name: format!("u1_0_{}.csv", blob_id),
            original_name: format!("{}.csv", blob_id),
            file_size: 4,
            content_type: "text/csv".to_string(),
            uploaded_at: "2026-08-01T10:00:00+00:00".to_string(),
            status: STATUS_UPLOADED.to_string(),
        }
    }

    #[tokio::test]
    async fn sweep_reports_orphans_and_dangling_records() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStore::new(dir.path());
        let db = Database::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let metadata = SqliteMetadataStore::new(db);

        // Consistent pair.
        storage
            .store("u1", "paired", Bytes::from_static(b"a,b\n"), "u1_0_paired.csv")
            .await
            .unwrap();
        metadata.create(&record("paired")).await.unwrap();

        // Blob with no record.
        storage
            .store("u1", "orphan", Bytes::from_static(b"a,b\n"), "u1_0_orphan.csv")
            .await
            .unwrap();

        // Record with no blob.
        metadata.create(&record("dangling")).await.unwrap();

        let report = MaintenanceService::sweep(&storage, &metadata).await.unwrap();
        assert_eq!(report.orphaned_blobs, vec!["orphan".to_string()]);
        assert_eq!(report.dangling_records, vec!["dangling".to_string()]);
    }

    #[tokio::test]
    async fn sweep_of_consistent_stores_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalBlobStore::new(dir.path());
        let db = Database::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let metadata = SqliteMetadataStore::new(db);

        let report = MaintenanceService::sweep(&storage, &metadata).await.unwrap();
        assert!(report.orphaned_blobs.is_empty());
        assert!(report.dangling_records.is_empty());
    }
}
