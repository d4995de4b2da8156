//! Scripted in-memory browser used by unit tests.

use async_trait::async_trait;
use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::StreamExt;
use std::sync::{Arc, Mutex};

use super::{scripts, BrowserPage, BrowserSession, ObservedResponse, ResponseStream};
use crate::error::CoreError;

pub(crate) fn response(url: &str) -> ObservedResponse {
    ObservedResponse {
        url: url.to_string(),
        status: 200,
        mime_type: "video/mp4".to_string(),
    }
}

/// What a fake page does when driven.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageScript {
    /// Responses emitted after navigation.
    pub on_goto: Vec<ObservedResponse>,
    /// Responses emitted after playback starts.
    pub on_play: Vec<ObservedResponse>,
    /// Responses emitted `late_after_ms` after navigation.
    pub late: Vec<ObservedResponse>,
    pub late_after_ms: u64,
    pub html: String,
    pub fail_goto: bool,
    pub has_overlay: bool,
    pub has_play_control: bool,
    /// Anchor hrefs visible after N scrolls; the last entry repeats.
    pub feed: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PageLog {
    pub opened: usize,
    pub closed: usize,
    pub gotos: Vec<String>,
    pub keys: Vec<String>,
    pub scrolls: usize,
    pub play_clicks: usize,
}

pub(crate) struct FakePage {
    script: PageScript,
    log: Arc<Mutex<PageLog>>,
    subscribers: Mutex<Vec<UnboundedSender<ObservedResponse>>>,
}

impl FakePage {
    pub(crate) fn new(script: PageScript) -> Self {
        Self::with_log(script, Arc::new(Mutex::new(PageLog::default())))
    }

    fn with_log(script: PageScript, log: Arc<Mutex<PageLog>>) -> Self {
        Self {
            script,
            log,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn log(&self) -> PageLog {
        self.log.lock().unwrap().clone()
    }

    fn emit(&self, responses: &[ObservedResponse]) {
        let subs = self.subscribers.lock().unwrap();
        for r in responses {
            for tx in subs.iter() {
                let _ = tx.unbounded_send(r.clone());
            }
        }
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<(), CoreError> {
        self.log.lock().unwrap().gotos.push(url.to_string());
        if self.script.fail_goto {
            return Err(CoreError::Browser("net::ERR_TIMED_OUT".to_string()));
        }
        self.emit(&self.script.on_goto);
        if !self.script.late.is_empty() {
            let subs = self.subscribers.lock().unwrap().clone();
            let late = self.script.late.clone();
            let delay = std::time::Duration::from_millis(self.script.late_after_ms);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                for r in late {
                    for tx in &subs {
                        let _ = tx.unbounded_send(r.clone());
                    }
                }
            });
        }
        Ok(())
    }

    async fn responses(&self) -> Result<ResponseStream, CoreError> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().unwrap().push(tx);
        Ok(rx.boxed())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, CoreError> {
        if script == scripts::POST_ANCHORS {
            let scrolls = self.log.lock().unwrap().scrolls;
            let visible = match self.script.feed.len() {
                0 => Vec::new(),
                n => self.script.feed[scrolls.min(n - 1)].clone(),
            };
            return Ok(serde_json::json!(visible));
        }
        if script == scripts::SCROLL_TO_BOTTOM {
            self.log.lock().unwrap().scrolls += 1;
            return Ok(serde_json::Value::Bool(true));
        }
        if script == scripts::DISMISS_OVERLAY {
            return Ok(serde_json::Value::Bool(self.script.has_overlay));
        }
        if script == scripts::PLAY_VIDEO {
            return Ok(serde_json::Value::Bool(false));
        }
        Ok(serde_json::Value::Null)
    }

    async fn click(&self, selector: &str) -> Result<bool, CoreError> {
        if selector == scripts::PLAY_CONTROL && self.script.has_play_control {
            self.log.lock().unwrap().play_clicks += 1;
            self.emit(&self.script.on_play);
            return Ok(true);
        }
        Ok(false)
    }

    async fn press_key(&self, key: &str) -> Result<(), CoreError> {
        self.log.lock().unwrap().keys.push(key.to_string());
        Ok(())
    }

    async fn content(&self) -> Result<String, CoreError> {
        Ok(self.script.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), CoreError> {
        self.log.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Session whose pages all follow the same script and share one log.
pub(crate) struct FakeSession {
    script: PageScript,
    log: Arc<Mutex<PageLog>>,
    pub fail_open: bool,
}

impl FakeSession {
    pub(crate) fn new(script: PageScript) -> Self {
        Self {
            script,
            log: Arc::new(Mutex::new(PageLog::default())),
            fail_open: false,
        }
    }

    pub(crate) fn log(&self) -> PageLog {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, CoreError> {
        if self.fail_open {
            return Err(CoreError::Browser("target crashed".to_string()));
        }
        self.log.lock().unwrap().opened += 1;
        Ok(Box::new(FakePage::with_log(
            self.script.clone(),
            Arc::clone(&self.log),
        )))
    }
}
