//! `reelsync enable|disable <handle>` – include or skip a handle during runs.

use anyhow::Result;
use reelsync_core::config::{self, normalize_handle, AppConfig};
use std::path::Path;

pub fn run_set_enabled(cfg_path: &Path, mut cfg: AppConfig, handle: &str, enabled: bool) -> Result<()> {
    cfg.set_enabled(handle, enabled)?;
    config::save_to_path(&cfg, cfg_path)?;
    let state = if enabled { "enabled" } else { "disabled" };
    println!("@{} {state}", normalize_handle(handle));
    Ok(())
}
