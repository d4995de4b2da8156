//! `reelsync resolve <post-url>` – show captured renditions of a post.

use anyhow::{bail, Context, Result};
use reelsync_core::config::AppConfig;
use reelsync_core::history::HistoryDb;
use reelsync_core::pipeline::Pipeline;
use reelsync_core::post::PostLink;

pub async fn run_resolve(cfg: AppConfig, url: &str) -> Result<()> {
    let link = PostLink::parse(url).with_context(|| format!("not a post URL: {url}"))?;
    let db = HistoryDb::open_default().await?;
    let mut pipeline = Pipeline::new(cfg, db);

    pipeline.launch().await?;
    let extraction = pipeline.resolve(&link).await;
    pipeline.shutdown().await;
    let extraction = extraction?;

    if !extraction.success {
        bail!(
            "{}: {}",
            link.short_code(),
            extraction.error.as_deref().unwrap_or("resolve failed")
        );
    }
    if let Some(best) = extraction.best() {
        if let Some(author) = &best.author {
            println!("author:  @{author}");
        }
        if let Some(caption) = &best.caption {
            println!("caption: {caption}");
        }
        if let Some(views) = best.view_count {
            println!("views:   {views}");
        }
    }
    for v in &extraction.videos {
        println!("{:>9} bps  {:<40}  {}", v.bitrate, v.quality_tag, v.url);
    }
    Ok(())
}
