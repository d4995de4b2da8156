//! Library facade: owns the browser session, history and transfer engine,
//! and exposes the pipeline operations.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::browser::{BrowserSession, ChromeSession};
use crate::collector::{CollectLinks, LinkCollector};
use crate::config::{validate_handle, AppConfig};
use crate::error::CoreError;
use crate::history::{DownloadRecord, HistoryDb};
use crate::orchestrator::{
    plan_profiles, run_batches, BatchOutcome, Orchestrator, ProfileReport, ProgressFn, RunSummary,
};
use crate::post::PostLink;
use crate::resolver::{AssetResolver, ExtractionResult, ResolvePost};
use crate::transfer::{DownloadResult, DownloadTask, FetchOptions, Transfer, TransferEngine};

/// Owner directory used when a fetched post has no known author.
const UNKNOWN_OWNER: &str = "unknown";

/// Directory owner for a fetched post: the explicit owner, else the scraped
/// author if it is a safe handle, else [`UNKNOWN_OWNER`].
fn fetch_owner(explicit: Option<String>, author: Option<&str>) -> String {
    explicit
        .or_else(|| author.and_then(|a| validate_handle(a).ok()))
        .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
}

pub struct Pipeline {
    config: AppConfig,
    history: HistoryDb,
    transfer: TransferEngine,
    session: Option<Arc<dyn BrowserSession>>,
    chrome: Option<Arc<ChromeSession>>,
}

impl Pipeline {
    pub fn new(config: AppConfig, history: HistoryDb) -> Self {
        let referer = format!("{}/", config.site_base_url.trim_end_matches('/'));
        let transfer = TransferEngine::new(
            config.retry_policy(),
            FetchOptions::new(config.browser.user_agent.clone(), Some(referer)),
        );
        Self {
            config,
            history,
            transfer,
            session: None,
            chrome: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryDb {
        &self.history
    }

    pub fn is_launched(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a headless browser. No-op if a session is already running.
    pub async fn launch(&mut self) -> Result<(), CoreError> {
        if self.is_launched() {
            return Ok(());
        }
        let chrome = Arc::new(ChromeSession::launch(&self.config.browser).await?);
        self.session = Some(chrome.clone() as Arc<dyn BrowserSession>);
        self.chrome = Some(chrome);
        Ok(())
    }

    /// Uses an already running session instead of launching one.
    pub fn attach_session(&mut self, session: Arc<dyn BrowserSession>) {
        self.session = Some(session);
    }

    /// Releases the browser session. Safe to call when nothing is running.
    pub async fn shutdown(&mut self) {
        self.session = None;
        let Some(chrome) = self.chrome.take() else {
            return;
        };
        match Arc::try_unwrap(chrome) {
            Ok(chrome) => {
                if let Err(e) = chrome.shutdown().await {
                    tracing::warn!("browser shutdown failed: {}", e);
                }
            }
            // Still shared; the last drop stops the handler.
            Err(_) => tracing::warn!("browser session still in use at shutdown"),
        }
    }

    fn session(&self, op: &'static str) -> Result<Arc<dyn BrowserSession>, CoreError> {
        self.session.clone().ok_or(CoreError::NotInitialized(op))
    }

    fn resolver(&self, op: &'static str) -> Result<AssetResolver, CoreError> {
        Ok(AssetResolver::new(self.session(op)?, self.config.browser.clone()))
    }

    fn collector(&self, op: &'static str) -> Result<LinkCollector, CoreError> {
        Ok(LinkCollector::new(
            self.session(op)?,
            self.config.browser.clone(),
            self.config.site_base_url.clone(),
        ))
    }

    /// Best renditions of one post, highest bitrate first.
    pub async fn resolve(&self, link: &PostLink) -> Result<ExtractionResult, CoreError> {
        Ok(self.resolver("resolve")?.resolve(link).await)
    }

    /// Post links of a profile, in feed order.
    pub async fn collect(
        &self,
        handle: &str,
        max_count: usize,
        scroll_timeout: Duration,
    ) -> Result<Vec<PostLink>, CoreError> {
        let handle = validate_handle(handle)?;
        Ok(self
            .collector("collect")?
            .collect(&handle, max_count, scroll_timeout)
            .await)
    }

    pub async fn transfer(&self, task: &DownloadTask, root: &Path) -> DownloadResult {
        self.transfer.transfer(task, root).await
    }

    /// Downloads `tasks` into the configured directory in configured batches.
    pub async fn run_batches(
        &self,
        tasks: &[DownloadTask],
        on_progress: Option<ProgressFn<'_>>,
    ) -> BatchOutcome {
        run_batches(
            &self.transfer,
            tasks,
            &self.config.download_dir,
            self.config.batch_size,
            on_progress,
        )
        .await
    }

    fn orchestrator<'a>(
        &'a self,
        collector: &'a LinkCollector,
        resolver: &'a AssetResolver,
    ) -> Orchestrator<'a> {
        Orchestrator {
            collector,
            resolver,
            transfer: &self.transfer,
            history: &self.history,
            download_dir: self.config.download_dir.clone(),
            batch_size: self.config.batch_size,
            scroll_timeout: self.config.scroll_timeout(),
        }
    }

    /// Syncs one profile on the running session.
    pub async fn sync_profile(
        &self,
        handle: &str,
        max_count: usize,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<ProfileReport, CoreError> {
        let collector = self.collector("sync_profile")?;
        let resolver = self.resolver("sync_profile")?;
        let handle = validate_handle(handle)?;
        self.orchestrator(&collector, &resolver)
            .sync_profile(&handle, max_count, on_progress)
            .await
    }

    /// Full run: launches the browser, syncs every selected profile and
    /// shuts the browser down again, on success or failure.
    pub async fn sync_all(
        &mut self,
        only: Option<&str>,
        max_override: Option<usize>,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<RunSummary, CoreError> {
        if let Some(handle) = only {
            validate_handle(handle)?;
        }
        let plans = plan_profiles(&self.config, only, max_override);
        if plans.is_empty() {
            tracing::info!("no enabled users to sync");
            return Ok(RunSummary::default());
        }

        let launched_here = !self.is_launched();
        self.launch().await?;
        let summary = match (self.collector("sync_all"), self.resolver("sync_all")) {
            (Ok(collector), Ok(resolver)) => Ok(self
                .orchestrator(&collector, &resolver)
                .sync_all(&plans, on_progress)
                .await),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };
        if launched_here {
            self.shutdown().await;
        }
        summary
    }

    /// Resolves and downloads a single post into `{download_dir}/{owner}/`,
    /// recording it in history on success.
    pub async fn fetch_post(
        &self,
        link: &PostLink,
        owner: Option<&str>,
    ) -> Result<DownloadResult, CoreError> {
        let owner = owner.map(validate_handle).transpose()?;
        let extraction = self.resolve(link).await?;
        let Some(best) = extraction.best() else {
            let error = extraction
                .error
                .clone()
                .unwrap_or_else(|| "no video assets captured".to_string());
            return Ok(DownloadResult::failed(link.short_code(), error));
        };

        let owner = fetch_owner(owner, best.author.as_deref());
        let task = DownloadTask {
            asset_url: best.url.clone(),
            owner_handle: owner.clone(),
            short_code: link.short_code().to_string(),
            caption: best.caption.clone(),
        };

        let result = self.transfer(&task, &self.config.download_dir).await;
        if let (true, Some(path)) = (result.success, result.file_path.as_deref()) {
            let record = DownloadRecord::new(&task.short_code, path, task.caption.clone(), result.size);
            self.history.add_record(&owner, &record).await?;
        }
        Ok(result)
    }
}
