//! `reelsync list` – show tracked users.

use reelsync_core::config::AppConfig;

pub fn run_list(cfg: &AppConfig) {
    if cfg.users.is_empty() {
        println!("No users tracked. Add one with `reelsync add <handle>`.");
        return;
    }
    println!("{:<24} {:<9} {:<5} {}", "HANDLE", "STATE", "MAX", "NOTE");
    for u in &cfg.users {
        println!(
            "{:<24} {:<9} {:<5} {}",
            format!("@{}", u.handle),
            if u.enabled { "enabled" } else { "disabled" },
            cfg.max_videos_for(u),
            u.note.as_deref().unwrap_or("")
        );
    }
}
