//! RAII guard that closes a page on every exit path.

use std::ops::Deref;

use super::BrowserPage;
use crate::error::CoreError;

/// Owns a page for the duration of one operation.
///
/// Prefer the explicit async [`PageGuard::close`]. If the guard is dropped
/// instead (early return, error, panic), the close is spawned on the runtime
/// captured at construction.
pub struct PageGuard {
    page: Option<Box<dyn BrowserPage>>,
    label: String,
    runtime: tokio::runtime::Handle,
}

impl PageGuard {
    pub fn new(page: Box<dyn BrowserPage>, label: impl Into<String>) -> Self {
        Self {
            page: Some(page),
            label: label.into(),
            runtime: tokio::runtime::Handle::current(),
        }
    }

    pub async fn close(mut self) -> Result<(), CoreError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("failed to close page for {}: {}", self.label, e);
                return Err(e);
            }
            tracing::trace!("closed page for {}", self.label);
        }
        Ok(())
    }
}

impl Deref for PageGuard {
    type Target = dyn BrowserPage;

    fn deref(&self) -> &Self::Target {
        // Only `close` takes the page, and it consumes the guard.
        match self.page.as_deref() {
            Some(page) => page,
            None => unreachable!("page guard used after close"),
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let label = std::mem::take(&mut self.label);
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::warn!("page drop cleanup failed for {}: {}", label, e);
                }
            });
        }
    }
}
