//! `reelsync add <handle>` – start tracking a handle.

use anyhow::Result;
use reelsync_core::config::{self, AppConfig, TrackedUser};
use std::path::Path;

pub fn run_add(
    cfg_path: &Path,
    mut cfg: AppConfig,
    handle: &str,
    max: Option<usize>,
    note: Option<String>,
) -> Result<()> {
    let mut user = TrackedUser::new(handle);
    user.max_videos = max;
    user.note = note;
    let normalized = user.handle.clone();
    cfg.add_user(user)?;
    config::save_to_path(&cfg, cfg_path)?;
    println!("Now tracking @{normalized}");
    Ok(())
}
