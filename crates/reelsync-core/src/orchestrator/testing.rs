//! Scripted pipeline stages used by orchestrator tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::collector::CollectLinks;
use crate::post::PostLink;
use crate::resolver::{ExtractionResult, ResolvePost, VideoInfo};
use crate::transfer::{DownloadResult, DownloadTask, Transfer};

pub(crate) const SITE: &str = "https://www.instagram.com";

pub(crate) fn task(code: &str) -> DownloadTask {
    DownloadTask {
        asset_url: format!("https://scontent.cdninstagram.com/v/{code}.mp4"),
        owner_handle: "natgeo".to_string(),
        short_code: code.to_string(),
        caption: None,
    }
}

pub(crate) fn links(codes: &[&str]) -> Vec<PostLink> {
    codes.iter().map(|c| PostLink::canonical(SITE, c)).collect()
}

/// Returns a fixed list of links for every handle.
#[derive(Default)]
pub(crate) struct FakeCollector {
    pub links: Vec<PostLink>,
    pub calls: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl CollectLinks for FakeCollector {
    async fn collect(&self, handle: &str, max_count: usize, _timeout: Duration) -> Vec<PostLink> {
        self.calls.lock().unwrap().push((handle.to_string(), max_count));
        self.links.iter().take(max_count).cloned().collect()
    }
}

/// Resolves every link to one asset, except the listed shortcodes.
#[derive(Default)]
pub(crate) struct FakeResolver {
    pub unresolvable: HashSet<String>,
    pub resolved: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub(crate) fn failing(codes: &[&str]) -> Self {
        Self {
            unresolvable: codes.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ResolvePost for FakeResolver {
    async fn resolve(&self, link: &PostLink) -> ExtractionResult {
        let code = link.short_code().to_string();
        self.resolved.lock().unwrap().push(code.clone());
        if self.unresolvable.contains(&code) {
            return ExtractionResult::failure("no video assets captured");
        }
        ExtractionResult::success(vec![VideoInfo {
            url: format!("https://scontent.cdninstagram.com/v/{code}.mp4"),
            bitrate: 1_000,
            quality_tag: "C3.720".to_string(),
            short_code: code.clone(),
            caption: Some(format!("caption {code}")),
            author: Some("natgeo".to_string()),
            view_count: None,
        }])
    }
}

/// Succeeds for every task except the listed shortcodes, tracking concurrency.
#[derive(Default)]
pub(crate) struct FakeTransfer {
    failing: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    pub seen: Mutex<Vec<DownloadTask>>,
}

impl FakeTransfer {
    pub(crate) fn failing(codes: &[&str]) -> Self {
        Self {
            failing: codes.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn transfer(&self, task: &DownloadTask, root: &Path) -> DownloadResult {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.seen.lock().unwrap().push(task.clone());
        if self.failing.contains(&task.short_code) {
            return DownloadResult::failed(&task.short_code, "HTTP 403");
        }
        let path = root.join(&task.owner_handle).join(task.file_name());
        DownloadResult::downloaded(&task.short_code, path, 1024)
    }
}
