//! `reelsync fetch <post-url>` – resolve and download one post.

use anyhow::{bail, Context, Result};
use reelsync_core::config::AppConfig;
use reelsync_core::history::HistoryDb;
use reelsync_core::pipeline::Pipeline;
use reelsync_core::post::PostLink;

use super::format_bytes;

pub async fn run_fetch(cfg: AppConfig, url: &str, owner: Option<&str>) -> Result<()> {
    let link = PostLink::parse(url).with_context(|| format!("not a post URL: {url}"))?;
    let db = HistoryDb::open_default().await?;
    let mut pipeline = Pipeline::new(cfg, db);

    pipeline.launch().await?;
    let result = pipeline.fetch_post(&link, owner).await;
    pipeline.shutdown().await;
    let result = result?;

    match (result.success, result.file_path) {
        (true, Some(path)) => {
            println!(
                "Saved {} ({})",
                path.display(),
                format_bytes(result.size.unwrap_or(0))
            );
            Ok(())
        }
        _ => bail!(
            "{}: {}",
            link.short_code(),
            result.error.unwrap_or_else(|| "download failed".to_string())
        ),
    }
}
