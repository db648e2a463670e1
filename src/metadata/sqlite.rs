use async_trait::async_trait;

use crate::db::Database;
use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::models::FileRecord;

/// SQLite-backed metadata store
pub struct SqliteMetadataStore {
    db: Database,
}

impl SqliteMetadataStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn create(&self, record: &FileRecord) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO file_records (id, owner_id, blob_id, storage_name, original_name, file_size, content_type, uploaded_at, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.owner_id)
        .bind(&record.blob_id)
        .bind(&record.storage_name)
        .bind(&record.original_name)
        .bind(record.file_size)
        .bind(&record.content_type)
        .bind(&record.uploaded_at)
        .bind(&record.status)
        .execute(self.db.pool())
        .await?;

        Ok(record.id.clone())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FileRecord>> {
        let records: Vec<FileRecord> = sqlx::query_as(
            "SELECT * FROM file_records WHERE owner_id = ? ORDER BY uploaded_at DESC",
        )
        .bind(owner_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(records)
    }

    async fn delete_by_blob(&self, blob_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM file_records WHERE blob_id = ?")
            .bind(blob_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_blob_ids(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT blob_id FROM file_records")
            .fetch_all(self.db.pool())
            .await?;

        Ok(ids)
    }
}
