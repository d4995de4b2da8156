//! CLI for reelsync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reelsync_core::config;

use commands::{
    run_add, run_fetch, run_history, run_list, run_remove, run_resolve, run_set_enabled,
    run_status, run_sync,
};

/// Top-level CLI for reelsync.
#[derive(Debug, Parser)]
#[command(name = "reelsync")]
#[command(about = "reelsync: keep local copies of tracked profiles' reels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Sync every enabled user (or one handle) and download new reels.
    Run {
        /// Only sync this handle (tracked or not).
        #[arg(long, value_name = "HANDLE")]
        user: Option<String>,
        /// Collect at most N posts per profile, overriding config.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
    },

    /// Start tracking a handle.
    Add {
        handle: String,
        /// Per-user limit of posts collected per run.
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Free-form note shown by `list`.
        #[arg(long, value_name = "TEXT")]
        note: Option<String>,
    },

    /// Stop tracking a handle.
    Remove {
        handle: String,
        /// Also forget its download history.
        #[arg(long)]
        forget: bool,
    },

    /// Re-enable a tracked handle.
    Enable { handle: String },

    /// Keep a handle tracked but skip it during runs.
    Disable { handle: String },

    /// List tracked users.
    List,

    /// Show download totals per handle.
    Status,

    /// Show recent downloads of a handle.
    History {
        handle: String,
        #[arg(long, default_value = "20", value_name = "N")]
        limit: u32,
    },

    /// Resolve and download a single post.
    Fetch {
        /// Post URL (`/reel/...`, `/p/...`).
        url: String,
        /// Directory/history owner; defaults to the post's author.
        #[arg(long, value_name = "HANDLE")]
        owner: Option<String>,
    },

    /// Print the media renditions captured for a post without downloading.
    Resolve {
        /// Post URL (`/reel/...`, `/p/...`).
        url: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg_path = config::config_path()?;
        let cfg = config::load_or_init_at(&cfg_path)?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { user, max } => run_sync(cfg, user.as_deref(), max).await?,
            CliCommand::Add { handle, max, note } => run_add(&cfg_path, cfg, &handle, max, note)?,
            CliCommand::Remove { handle, forget } => {
                run_remove(&cfg_path, cfg, &handle, forget).await?
            }
            CliCommand::Enable { handle } => run_set_enabled(&cfg_path, cfg, &handle, true)?,
            CliCommand::Disable { handle } => run_set_enabled(&cfg_path, cfg, &handle, false)?,
            CliCommand::List => run_list(&cfg),
            CliCommand::Status => run_status(&cfg).await?,
            CliCommand::History { handle, limit } => run_history(&handle, limit).await?,
            CliCommand::Fetch { url, owner } => run_fetch(cfg, &url, owner.as_deref()).await?,
            CliCommand::Resolve { url } => run_resolve(cfg, &url).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
