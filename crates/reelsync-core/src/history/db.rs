//! SQLite-backed history database: connection, schema and timestamp helpers.
//! Record reads and writes live in `records`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS downloads (
    handle TEXT NOT NULL,
    short_code TEXT NOT NULL,
    file_path TEXT NOT NULL,
    caption TEXT,
    size INTEGER,
    downloaded_at INTEGER NOT NULL,
    PRIMARY KEY (handle, short_code)
);
CREATE INDEX IF NOT EXISTS downloads_by_time ON downloads (handle, downloaded_at);
"#;

/// Which posts have been downloaded, per handle.
///
/// Lives at `~/.local/state/reelsync/history.db` unless opened elsewhere.
#[derive(Clone)]
pub struct HistoryDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl HistoryDb {
    pub async fn open_default() -> Result<Self, CoreError> {
        let state_home = xdg::BaseDirectories::with_prefix("reelsync")
            .map_err(|e| CoreError::Config(e.to_string()))?
            .get_state_home();
        Self::open_at(state_home.join("reelsync").join("history.db")).await
    }

    /// Opens `path`, creating the file and its parent directories on first use.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: Pool<Sqlite>) -> Result<Self, CoreError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }
}

pub(crate) fn unix_timestamp() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(_) => 0,
    }
}

/// Private in-memory database; one connection so every query sees the schema.
#[cfg(test)]
pub(crate) async fn open_memory() -> Result<HistoryDb, CoreError> {
    let options = SqliteConnectOptions::new().in_memory(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    HistoryDb::with_pool(pool).await
}
