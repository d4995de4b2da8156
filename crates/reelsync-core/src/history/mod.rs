//! Persistent download history (SQLite via sqlx).
//!
//! One append-only list of downloaded posts per handle, keyed by shortcode.
//! This is what makes repeated runs idempotent.

pub mod db;
mod records;
pub mod types;

pub use db::*;
pub use types::*;
