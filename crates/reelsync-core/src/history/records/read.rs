//! History reads: lookups, listings and per-handle summaries.

use sqlx::Row;
use std::collections::HashSet;

use crate::error::CoreError;
use crate::history::db::HistoryDb;
use crate::history::types::{DownloadRecord, HandleSummary};

impl HistoryDb {
    /// Every shortcode already downloaded for `handle`.
    pub async fn downloaded_codes(&self, handle: &str) -> Result<HashSet<String>, CoreError> {
        let rows = sqlx::query("SELECT short_code FROM downloads WHERE handle = ?1")
            .bind(handle)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get::<String, _>("short_code")).collect())
    }

    pub async fn is_downloaded(&self, handle: &str, short_code: &str) -> Result<bool, CoreError> {
        let row = sqlx::query("SELECT 1 FROM downloads WHERE handle = ?1 AND short_code = ?2")
            .bind(handle)
            .bind(short_code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Records of a handle, newest first. `None` returns all of them.
    pub async fn records(
        &self,
        handle: &str,
        limit: Option<u32>,
    ) -> Result<Vec<DownloadRecord>, CoreError> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = sqlx::query(
            r#"
            SELECT short_code, file_path, caption, size, downloaded_at
            FROM downloads
            WHERE handle = ?1
            ORDER BY downloaded_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(handle)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DownloadRecord {
                short_code: r.get("short_code"),
                file_path: r.get("file_path"),
                caption: r.get("caption"),
                size: r.get::<Option<i64>, _>("size").map(|s| s.max(0) as u64),
                downloaded_at: r.get("downloaded_at"),
            })
            .collect())
    }

    /// Count, total bytes and last download time per handle, ordered by handle.
    pub async fn summary(&self) -> Result<Vec<HandleSummary>, CoreError> {
        let rows = sqlx::query(
            r#"
            SELECT handle,
                   COUNT(*) AS count,
                   COALESCE(SUM(size), 0) AS total_bytes,
                   MAX(downloaded_at) AS last_download
            FROM downloads
            GROUP BY handle
            ORDER BY handle ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| HandleSummary {
                handle: r.get("handle"),
                count: r.get::<i64, _>("count").max(0) as u64,
                total_bytes: r.get::<i64, _>("total_bytes").max(0) as u64,
                last_download: r.get("last_download"),
            })
            .collect())
    }
}
