//! Types stored in and read from the history database.

use std::path::Path;

use super::db::unix_timestamp;

/// A post that was downloaded for a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub short_code: String,
    pub file_path: String,
    pub caption: Option<String>,
    pub size: Option<u64>,
    /// Unix seconds.
    pub downloaded_at: i64,
}

impl DownloadRecord {
    /// Record stamped with the current time.
    pub fn new(
        short_code: impl Into<String>,
        file_path: &Path,
        caption: Option<String>,
        size: Option<u64>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            file_path: file_path.to_string_lossy().into_owned(),
            caption,
            size,
            downloaded_at: unix_timestamp(),
        }
    }
}

/// Per-handle totals used by the CLI `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleSummary {
    pub handle: String,
    pub count: u64,
    pub total_bytes: u64,
    /// Unix seconds of the most recent download.
    pub last_download: Option<i64>,
}
