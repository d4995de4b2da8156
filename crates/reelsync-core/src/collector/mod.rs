//! Link Collector: scrolls a profile's reels feed and gathers post links.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::browser::{self, overlay, scripts, BrowserPage, BrowserSession, PageGuard};
use crate::config::BrowserSettings;
use crate::error::CoreError;
use crate::post::PostLink;

/// Scroll rounds without a new link before the feed counts as exhausted.
pub const STALL_ROUNDS: u32 = 3;

#[async_trait]
pub trait CollectLinks: Send + Sync {
    /// Links in discovery order, deduplicated by shortcode, at most
    /// `max_count`. Best-effort: failures yield an empty list.
    async fn collect(
        &self,
        handle: &str,
        max_count: usize,
        scroll_timeout: Duration,
    ) -> Vec<PostLink>;
}

pub struct LinkCollector {
    session: Arc<dyn BrowserSession>,
    settings: BrowserSettings,
    site_base_url: String,
}

/// Ordered set of links keyed by shortcode.
#[derive(Debug, Default)]
struct Discovered {
    links: Vec<PostLink>,
    seen: HashSet<String>,
}

impl Discovered {
    fn insert(&mut self, link: PostLink) {
        if self.seen.insert(link.short_code().to_string()) {
            self.links.push(link);
        }
    }

    fn len(&self) -> usize {
        self.links.len()
    }
}

impl LinkCollector {
    pub fn new(
        session: Arc<dyn BrowserSession>,
        settings: BrowserSettings,
        site_base_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            settings,
            site_base_url: site_base_url.into(),
        }
    }

    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}/{}/reels/", self.site_base_url.trim_end_matches('/'), handle)
    }

    async fn read_anchors(
        &self,
        page: &dyn BrowserPage,
        into: &mut Discovered,
    ) -> Result<(), CoreError> {
        let value = page.evaluate(scripts::POST_ANCHORS).await?;
        let hrefs = value.as_array().cloned().unwrap_or_default();
        for href in hrefs.iter().filter_map(|h| h.as_str()) {
            if let Some(link) = PostLink::from_href(&self.site_base_url, href) {
                into.insert(link);
            }
        }
        Ok(())
    }

    async fn scroll_feed(
        &self,
        page: &dyn BrowserPage,
        handle: &str,
        max_count: usize,
        scroll_timeout: Duration,
    ) -> Result<Vec<PostLink>, CoreError> {
        let url = self.profile_url(handle);
        browser::navigate(page, &url, self.settings.navigation_timeout()).await?;
        overlay::dismiss_overlay(page).await;

        let started = Instant::now();
        let mut found = Discovered::default();
        let mut stalled = 0u32;
        let mut scrolled = false;
        loop {
            let before = found.len();
            self.read_anchors(page, &mut found).await?;

            if found.len() >= max_count {
                tracing::debug!(handle, count = found.len(), "reached max count");
                break;
            }
            if started.elapsed() >= scroll_timeout {
                tracing::debug!(handle, count = found.len(), "scroll timeout reached");
                break;
            }
            // Only a scroll that yielded nothing counts as a stalled round.
            if scrolled && found.len() == before {
                stalled += 1;
                if stalled >= STALL_ROUNDS {
                    tracing::debug!(handle, count = found.len(), "feed stopped growing");
                    break;
                }
            } else {
                stalled = 0;
            }

            page.evaluate(scripts::SCROLL_TO_BOTTOM).await?;
            scrolled = true;
            tokio::time::sleep(self.settings.scroll_delay()).await;
        }

        let mut links = found.links;
        links.truncate(max_count);
        Ok(links)
    }
}

#[async_trait]
impl CollectLinks for LinkCollector {
    async fn collect(
        &self,
        handle: &str,
        max_count: usize,
        scroll_timeout: Duration,
    ) -> Vec<PostLink> {
        if max_count == 0 {
            return Vec::new();
        }
        let page = match self.session.open_page().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(handle, "could not open page: {}", e);
                return Vec::new();
            }
        };
        let guard = PageGuard::new(page, format!("@{handle}"));
        let links = match self.scroll_feed(&*guard, handle, max_count, scroll_timeout).await {
            Ok(links) => links,
            Err(e) => {
                tracing::warn!(handle, "link collection failed: {}", e);
                Vec::new()
            }
        };
        let _ = guard.close().await;
        tracing::info!(handle, count = links.len(), "collected post links");
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeSession, PageScript};

    const SITE: &str = "https://www.instagram.com";

    fn hrefs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| format!("/reel/{c}/")).collect()
    }

    fn collector(session: &Arc<FakeSession>) -> LinkCollector {
        let settings = BrowserSettings {
            scroll_delay_ms: 1,
            ..BrowserSettings::default()
        };
        LinkCollector::new(session.clone() as Arc<dyn BrowserSession>, settings, SITE)
    }

    fn codes(links: &[PostLink]) -> Vec<&str> {
        links.iter().map(|l| l.short_code()).collect()
    }

    #[tokio::test]
    async fn stalled_feed_returns_what_was_found() {
        let session = Arc::new(FakeSession::new(PageScript {
            feed: vec![hrefs(&["A", "B"]), hrefs(&["A", "B", "C", "D"])],
            ..PageScript::default()
        }));
        let links = collector(&session)
            .collect("natgeo", 10, Duration::from_secs(30))
            .await;
        assert_eq!(codes(&links), vec!["A", "B", "C", "D"]);
        let log = session.log();
        assert_eq!(log.gotos, vec![format!("{SITE}/natgeo/reels/")]);
        // Two growing reads, then three unchanged ones.
        assert_eq!(log.scrolls, 4);
        assert_eq!(log.closed, 1);
    }

    #[tokio::test]
    async fn empty_feed_gets_three_scroll_rounds() {
        let session = Arc::new(FakeSession::new(PageScript::default()));
        let links = collector(&session)
            .collect("natgeo", 10, Duration::from_secs(30))
            .await;
        assert!(links.is_empty());
        assert_eq!(session.log().scrolls, STALL_ROUNDS as usize);
    }

    #[tokio::test]
    async fn stops_and_truncates_at_max_count() {
        let session = Arc::new(FakeSession::new(PageScript {
            feed: vec![hrefs(&["A", "B", "B", "C"]), hrefs(&["A", "B", "C", "D", "E", "F"])],
            ..PageScript::default()
        }));
        let links = collector(&session)
            .collect("natgeo", 5, Duration::from_secs(30))
            .await;
        assert_eq!(codes(&links), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(session.log().scrolls, 1);
    }

    #[tokio::test]
    async fn links_are_canonical_and_deduplicated() {
        let session = Arc::new(FakeSession::new(PageScript {
            feed: vec![vec![
                "/natgeo/reel/X1/".to_string(),
                "/p/X1/".to_string(),
                "/explore/".to_string(),
                "https://www.instagram.com/reel/X2/?igsh=1".to_string(),
            ]],
            ..PageScript::default()
        }));
        let links = collector(&session)
            .collect("natgeo", 10, Duration::from_secs(30))
            .await;
        assert_eq!(codes(&links), vec!["X1", "X2"]);
        assert_eq!(links[1].url(), "https://www.instagram.com/reel/X2/");
    }

    #[tokio::test]
    async fn zero_timeout_reads_once() {
        let session = Arc::new(FakeSession::new(PageScript {
            feed: vec![hrefs(&["A"]), hrefs(&["A", "B"])],
            ..PageScript::default()
        }));
        let links = collector(&session).collect("natgeo", 10, Duration::ZERO).await;
        assert_eq!(codes(&links), vec!["A"]);
        assert_eq!(session.log().scrolls, 0);
    }

    #[tokio::test]
    async fn navigation_failure_yields_empty() {
        let session = Arc::new(FakeSession::new(PageScript {
            fail_goto: true,
            feed: vec![hrefs(&["A"])],
            ..PageScript::default()
        }));
        let links = collector(&session)
            .collect("natgeo", 10, Duration::from_secs(30))
            .await;
        assert!(links.is_empty());
        assert_eq!(session.log().closed, 1);
    }
}
