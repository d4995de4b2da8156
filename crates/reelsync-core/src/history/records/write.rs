//! History writes: insert (idempotent) and clear.

use crate::error::CoreError;
use crate::history::db::HistoryDb;
use crate::history::types::DownloadRecord;

const INSERT_RECORD: &str = r#"
    INSERT OR IGNORE INTO downloads (
        handle, short_code, file_path, caption, size, downloaded_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

impl HistoryDb {
    /// Record a download. Returns false if the shortcode was already recorded
    /// for this handle (the existing record is kept).
    pub async fn add_record(&self, handle: &str, record: &DownloadRecord) -> Result<bool, CoreError> {
        let res = sqlx::query(INSERT_RECORD)
            .bind(handle)
            .bind(&record.short_code)
            .bind(&record.file_path)
            .bind(&record.caption)
            .bind(record.size.map(|s| s as i64))
            .bind(record.downloaded_at)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Record several downloads in one transaction. Returns how many were new.
    pub async fn add_records(
        &self,
        handle: &str,
        records: &[DownloadRecord],
    ) -> Result<usize, CoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;
        for record in records {
            let res = sqlx::query(INSERT_RECORD)
                .bind(handle)
                .bind(&record.short_code)
                .bind(&record.file_path)
                .bind(&record.caption)
                .bind(record.size.map(|s| s as i64))
                .bind(record.downloaded_at)
                .execute(&mut *tx)
                .await?;
            inserted += res.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(inserted)
    }

    /// Forget every download of a handle. Returns the number of removed records.
    pub async fn clear_handle(&self, handle: &str) -> Result<u64, CoreError> {
        let res = sqlx::query("DELETE FROM downloads WHERE handle = ?1")
            .bind(handle)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
