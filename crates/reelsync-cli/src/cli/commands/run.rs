//! `reelsync run` – sync tracked profiles.

use anyhow::Result;
use reelsync_core::config::AppConfig;
use reelsync_core::history::HistoryDb;
use reelsync_core::pipeline::Pipeline;
use reelsync_core::transfer::DownloadResult;

use super::format_bytes;

pub async fn run_sync(cfg: AppConfig, user: Option<&str>, max: Option<usize>) -> Result<()> {
    let db = HistoryDb::open_default().await?;
    let mut pipeline = Pipeline::new(cfg, db);

    let mut on_progress = |done: usize, total: usize, r: &DownloadResult| {
        match (&r.error, r.success) {
            (_, true) => println!("  [{done}/{total}] {} saved", r.short_code),
            (Some(e), false) => println!("  [{done}/{total}] {} failed: {e}", r.short_code),
            (None, false) => println!("  [{done}/{total}] {} failed", r.short_code),
        }
    };
    let summary = pipeline.sync_all(user, max, Some(&mut on_progress)).await?;

    if summary.profiles.is_empty() && summary.failed_profiles.is_empty() {
        println!("Nothing to sync. Add a user with `reelsync add <handle>`.");
        return Ok(());
    }
    for p in &summary.profiles {
        println!(
            "@{}: {} collected, {} new, {} downloaded, {} failed ({})",
            p.handle,
            p.collected,
            p.new_links,
            p.downloaded,
            p.failed + p.resolve_failed,
            p.stage
        );
    }
    for (handle, err) in &summary.failed_profiles {
        println!("@{handle}: aborted: {err}");
    }
    println!(
        "Done: {} downloaded ({}), {} failed",
        summary.downloaded(),
        format_bytes(summary.bytes()),
        summary.failed()
    );
    Ok(())
}
