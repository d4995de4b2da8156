//! `reelsync remove <handle>` – stop tracking a handle.

use anyhow::Result;
use reelsync_core::config::{self, AppConfig};
use reelsync_core::history::HistoryDb;
use std::path::Path;

pub async fn run_remove(cfg_path: &Path, mut cfg: AppConfig, handle: &str, forget: bool) -> Result<()> {
    let removed = cfg.remove_user(handle)?;
    config::save_to_path(&cfg, cfg_path)?;
    println!("Stopped tracking @{}", removed.handle);

    if forget {
        let db = HistoryDb::open_default().await?;
        let n = db.clear_handle(&removed.handle).await?;
        println!("Forgot {n} download record(s)");
    }
    Ok(())
}
