//! `reelsync status` – download totals per handle.

use anyhow::Result;
use reelsync_core::config::AppConfig;
use reelsync_core::history::HistoryDb;
use reelsync_core::logging;

use super::{format_age, format_bytes};

pub async fn run_status(cfg: &AppConfig) -> Result<()> {
    let db = HistoryDb::open_default().await?;
    let summary = db.summary().await?;
    println!("Download dir: {}", cfg.download_dir.display());
    if let Ok(path) = logging::log_path() {
        println!("Log file:     {}", path.display());
    }
    if summary.is_empty() {
        println!("Nothing downloaded yet.");
        return Ok(());
    }
    println!("{:<24} {:>7} {:>11} {}", "HANDLE", "POSTS", "SIZE", "LAST");
    for s in summary {
        let tracked = match cfg.find_user(&s.handle) {
            Some(u) if u.enabled => "",
            Some(_) => " (disabled)",
            None => " (untracked)",
        };
        println!(
            "{:<24} {:>7} {:>11} {}{}",
            format!("@{}", s.handle),
            s.count,
            format_bytes(s.total_bytes),
            s.last_download.map(format_age).unwrap_or_else(|| "-".to_string()),
            tracked
        );
    }
    Ok(())
}
