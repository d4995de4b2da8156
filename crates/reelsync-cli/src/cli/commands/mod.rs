//! CLI command handlers, one file per command.

mod add;
mod fetch;
mod history;
mod list;
mod remove;
mod resolve;
mod run;
mod status;
mod toggle;

pub use add::run_add;
pub use fetch::run_fetch;
pub use history::run_history;
pub use list::run_list;
pub use remove::run_remove;
pub use resolve::run_resolve;
pub use run::run_sync;
pub use status::run_status;
pub use toggle::run_set_enabled;

use std::time::{SystemTime, UNIX_EPOCH};

/// `1536` → `1.5 KiB`.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Coarse age of a Unix timestamp relative to now (`5m ago`, `3d ago`).
pub(crate) fn format_age(ts: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(ts);
    let secs = (now - ts).max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
