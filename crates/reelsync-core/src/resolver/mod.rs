//! Asset Resolver: finds the best media stream for a post by watching the
//! network traffic of a real page load.

mod capture;
mod descriptor;
mod metadata;

pub use capture::{
    asset_response_predicate, best_by_normalized_url, normalize_url, reduce_responses,
    CapturedAsset,
};
pub use descriptor::{decode_descriptor, is_asset_url, AssetDescriptor, UNKNOWN_QUALITY};
pub use metadata::PostMetadata;

use async_trait::async_trait;
use std::sync::Arc;

use crate::browser::{self, overlay, BrowserPage, BrowserSession, PageGuard, ResponseObserver};
use crate::config::BrowserSettings;
use crate::error::CoreError;
use crate::post::PostLink;

/// A resolved rendition plus whatever metadata the page exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub url: String,
    pub bitrate: u64,
    pub quality_tag: String,
    pub short_code: String,
    pub caption: Option<String>,
    pub author: Option<String>,
    pub view_count: Option<u64>,
}

/// Outcome of resolving one post. `videos` is sorted by descending bitrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub success: bool,
    pub videos: Vec<VideoInfo>,
    pub error: Option<String>,
}

impl ExtractionResult {
    pub fn success(videos: Vec<VideoInfo>) -> Self {
        Self {
            success: true,
            videos,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            videos: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Highest-bitrate rendition, if any.
    pub fn best(&self) -> Option<&VideoInfo> {
        self.videos.first()
    }
}

#[async_trait]
pub trait ResolvePost: Send + Sync {
    /// Never fails: environmental problems are reported in the result.
    async fn resolve(&self, link: &PostLink) -> ExtractionResult;
}

pub struct AssetResolver {
    session: Arc<dyn BrowserSession>,
    settings: BrowserSettings,
}

impl AssetResolver {
    pub fn new(session: Arc<dyn BrowserSession>, settings: BrowserSettings) -> Self {
        Self { session, settings }
    }

    async fn extract(
        &self,
        page: &dyn BrowserPage,
        link: &PostLink,
    ) -> Result<ExtractionResult, CoreError> {
        let observer = ResponseObserver::attach(page, asset_response_predicate()).await?;

        browser::navigate(page, link.url(), self.settings.navigation_timeout()).await?;
        overlay::dismiss_overlay(page).await;

        tokio::time::sleep(self.settings.settle_delay()).await;
        let mut assets = reduce_responses(&observer.snapshot());

        if assets.is_empty() {
            // Late responses from the load still count, with or without playback.
            let played = overlay::start_playback(page).await;
            tracing::debug!(short_code = %link.short_code(), played, "no assets after load, extending observation");
            tokio::time::sleep(self.settings.play_settle_delay()).await;
            assets = reduce_responses(&observer.snapshot());
        }
        drop(observer);

        if assets.is_empty() {
            return Ok(ExtractionResult::failure("no video assets captured"));
        }

        let meta = match page.content().await {
            Ok(html) => PostMetadata::from_html(&html),
            Err(e) => {
                tracing::debug!(short_code = %link.short_code(), "metadata unavailable: {}", e);
                PostMetadata::default()
            }
        };

        let videos = assets
            .into_iter()
            .map(|a| VideoInfo {
                url: a.url,
                bitrate: a.bitrate,
                quality_tag: a.quality_tag,
                short_code: link.short_code().to_string(),
                caption: meta.caption.clone(),
                author: meta.author.clone(),
                view_count: meta.view_count,
            })
            .collect();
        Ok(ExtractionResult::success(videos))
    }
}

#[async_trait]
impl ResolvePost for AssetResolver {
    async fn resolve(&self, link: &PostLink) -> ExtractionResult {
        let page = match self.session.open_page().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(short_code = %link.short_code(), "could not open page: {}", e);
                return ExtractionResult::failure(e.to_string());
            }
        };
        let guard = PageGuard::new(page, link.short_code());

        let result = match self.extract(&*guard, link).await {
            Ok(r) => r,
            Err(e) => ExtractionResult::failure(e.to_string()),
        };
        let _ = guard.close().await;

        match (&result.error, result.best()) {
            (_, Some(best)) => tracing::info!(
                short_code = %link.short_code(),
                bitrate = best.bitrate,
                renditions = result.videos.len(),
                "resolved asset"
            ),
            (Some(err), None) => {
                tracing::warn!(short_code = %link.short_code(), "resolve failed: {}", err)
            }
            (None, None) => {}
        }
        result
    }
}
