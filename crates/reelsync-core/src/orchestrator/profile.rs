//! One profile through the pipeline:
//! collect → filter against history → resolve → transfer → record.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::batch::{run_batches, ProgressFn};
use crate::collector::CollectLinks;
use crate::config::validate_handle;
use crate::error::CoreError;
use crate::history::{DownloadRecord, HistoryDb};
use crate::post::PostLink;
use crate::resolver::ResolvePost;
use crate::transfer::{DownloadTask, Transfer};

/// Where a profile run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStage {
    Collecting,
    Filtering,
    /// Nothing new to download (or nothing resolved).
    Skipped,
    Resolving,
    Transferring,
    Recording,
    Done,
}

impl ProfileStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileStage::Collecting => "collecting",
            ProfileStage::Filtering => "filtering",
            ProfileStage::Skipped => "skipped",
            ProfileStage::Resolving => "resolving",
            ProfileStage::Transferring => "transferring",
            ProfileStage::Recording => "recording",
            ProfileStage::Done => "done",
        }
    }
}

impl fmt::Display for ProfileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts for one synced profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileReport {
    pub handle: String,
    pub stage: ProfileStage,
    pub collected: usize,
    pub new_links: usize,
    pub resolve_failed: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Records newly written to history.
    pub recorded: usize,
    pub bytes: u64,
}

impl ProfileReport {
    fn new(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            stage: ProfileStage::Collecting,
            collected: 0,
            new_links: 0,
            resolve_failed: 0,
            downloaded: 0,
            failed: 0,
            recorded: 0,
            bytes: 0,
        }
    }

    fn enter(&mut self, stage: ProfileStage) {
        tracing::debug!(handle = %self.handle, "{} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

/// Links whose shortcode is not in `known`, in original order.
pub fn filter_new_links(links: Vec<PostLink>, known: &HashSet<String>) -> Vec<PostLink> {
    links
        .into_iter()
        .filter(|l| !known.contains(l.short_code()))
        .collect()
}

/// The pipeline stages wired together for a run.
pub struct Orchestrator<'a> {
    pub collector: &'a dyn CollectLinks,
    pub resolver: &'a dyn ResolvePost,
    pub transfer: &'a dyn Transfer,
    pub history: &'a HistoryDb,
    pub download_dir: PathBuf,
    pub batch_size: usize,
    pub scroll_timeout: Duration,
}

impl Orchestrator<'_> {
    /// Resolves `links` one at a time into download tasks for `handle`.
    /// Returns the tasks and the number of links that failed to resolve.
    pub async fn resolve_tasks(&self, handle: &str, links: &[PostLink]) -> (Vec<DownloadTask>, usize) {
        let mut tasks = Vec::with_capacity(links.len());
        let mut failed = 0usize;
        for link in links {
            let result = self.resolver.resolve(link).await;
            match result.best() {
                Some(best) if result.success => tasks.push(DownloadTask {
                    asset_url: best.url.clone(),
                    owner_handle: handle.to_string(),
                    short_code: link.short_code().to_string(),
                    caption: best.caption.clone(),
                }),
                _ => {
                    failed += 1;
                    tracing::warn!(
                        handle,
                        short_code = %link.short_code(),
                        "skipping post: {}",
                        result.error.as_deref().unwrap_or("no rendition")
                    );
                }
            }
        }
        (tasks, failed)
    }

    /// Syncs one profile. Environmental failures are counted in the report;
    /// only an invalid handle or history errors are returned.
    pub async fn sync_profile(
        &self,
        handle: &str,
        max_count: usize,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<ProfileReport, CoreError> {
        let handle = validate_handle(handle)?;
        let handle = handle.as_str();
        let mut report = ProfileReport::new(handle);
        tracing::info!(handle, max_count, "syncing profile");

        let links = self.collector.collect(handle, max_count, self.scroll_timeout).await;
        report.collected = links.len();

        report.enter(ProfileStage::Filtering);
        let known = self.history.downloaded_codes(handle).await?;
        let new_links = filter_new_links(links, &known);
        report.new_links = new_links.len();
        if new_links.is_empty() {
            tracing::info!(handle, collected = report.collected, "no new posts");
            report.enter(ProfileStage::Skipped);
            return Ok(report);
        }

        report.enter(ProfileStage::Resolving);
        let (tasks, resolve_failed) = self.resolve_tasks(handle, &new_links).await;
        report.resolve_failed = resolve_failed;
        if tasks.is_empty() {
            tracing::warn!(handle, resolve_failed, "no posts resolved, skipping transfers");
            report.enter(ProfileStage::Skipped);
            return Ok(report);
        }

        report.enter(ProfileStage::Transferring);
        let outcome = run_batches(
            self.transfer,
            &tasks,
            &self.download_dir,
            self.batch_size,
            on_progress,
        )
        .await;
        report.downloaded = outcome.downloaded;
        report.failed = outcome.failed;

        report.enter(ProfileStage::Recording);
        let records: Vec<DownloadRecord> = tasks
            .iter()
            .zip(&outcome.results)
            .filter(|(_, r)| r.success)
            .filter_map(|(task, r)| {
                let path = r.file_path.as_deref()?;
                Some(DownloadRecord::new(&task.short_code, path, task.caption.clone(), r.size))
            })
            .collect();
        report.bytes = records.iter().filter_map(|r| r.size).sum();
        report.recorded = self.history.add_records(handle, &records).await?;

        report.enter(ProfileStage::Done);
        tracing::info!(
            handle,
            downloaded = report.downloaded,
            failed = report.failed,
            resolve_failed = report.resolve_failed,
            "profile synced"
        );
        Ok(report)
    }
}
