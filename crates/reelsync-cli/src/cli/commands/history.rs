//! `reelsync history <handle>` – recent downloads of one handle.

use anyhow::Result;
use reelsync_core::config::normalize_handle;
use reelsync_core::history::HistoryDb;

use super::{format_age, format_bytes};

pub async fn run_history(handle: &str, limit: u32) -> Result<()> {
    let handle = normalize_handle(handle);
    let db = HistoryDb::open_default().await?;
    let records = db.records(&handle, Some(limit)).await?;
    if records.is_empty() {
        println!("No downloads recorded for @{handle}.");
        return Ok(());
    }
    for r in records {
        let size = r.size.map(format_bytes).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<14} {:>10} {:>9}  {}",
            r.short_code,
            size,
            format_age(r.downloaded_at),
            r.file_path
        );
    }
    Ok(())
}
