//! Headless browser seam.
//!
//! The resolver and collector only talk to [`BrowserSession`] and
//! [`BrowserPage`]; [`chrome`] implements them over CDP. Pages are owned by a
//! [`PageGuard`] and network traffic is watched through a [`ResponseObserver`].

pub mod chrome;
mod guard;
mod observer;
pub mod overlay;
pub(crate) mod scripts;

#[cfg(test)]
pub(crate) mod testing;

pub use chrome::ChromeSession;
pub use guard::PageGuard;
pub use observer::{ResponseObserver, ResponsePredicate, MAX_OBSERVED_RESPONSES};

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::time::Duration;

use crate::error::CoreError;

/// One network response seen by a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedResponse {
    pub url: String,
    pub status: u16,
    pub mime_type: String,
}

/// Stream of responses received by a page after subscription.
pub type ResponseStream = BoxStream<'static, ObservedResponse>;

/// A browser context able to create pages. Pages from one session share
/// cookies; the session itself is isolated from any user profile.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, CoreError>;
}

/// The page operations the pipeline needs.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load event.
    async fn goto(&self, url: &str) -> Result<(), CoreError>;

    /// Subscribe to responses received from now on.
    async fn responses(&self) -> Result<ResponseStream, CoreError>;

    /// Evaluate a script and return its JSON-serializable result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, CoreError>;

    /// Click the first element matching `selector`. `Ok(false)` if none matched.
    async fn click(&self, selector: &str) -> Result<bool, CoreError>;

    /// Press a key (e.g. `"Escape"`) on the document body.
    async fn press_key(&self, key: &str) -> Result<(), CoreError>;

    /// Current serialized DOM.
    async fn content(&self) -> Result<String, CoreError>;

    async fn close(self: Box<Self>) -> Result<(), CoreError>;
}

/// `goto` bounded by `timeout`; an expired timer is a browser error.
pub async fn navigate(page: &dyn BrowserPage, url: &str, timeout: Duration) -> Result<(), CoreError> {
    match tokio::time::timeout(timeout, page.goto(url)).await {
        Ok(res) => res,
        Err(_) => Err(CoreError::Browser(format!(
            "navigation to {url} timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
