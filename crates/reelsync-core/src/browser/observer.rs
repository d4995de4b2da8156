//! Bounded capture of matching network responses for the lifetime of a scope.

use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use super::{BrowserPage, ObservedResponse};
use crate::error::CoreError;

/// Upper bound on buffered responses per observer.
pub const MAX_OBSERVED_RESPONSES: usize = 512;

pub type ResponsePredicate = Arc<dyn Fn(&ObservedResponse) -> bool + Send + Sync>;

/// Collects responses accepted by a predicate into a bounded buffer.
///
/// The background task is aborted when the observer is dropped, which also
/// drops the underlying event subscription.
pub struct ResponseObserver {
    buffer: Arc<Mutex<Vec<ObservedResponse>>>,
    task: JoinHandle<()>,
}

impl ResponseObserver {
    pub async fn attach(
        page: &dyn BrowserPage,
        predicate: ResponsePredicate,
    ) -> Result<Self, CoreError> {
        let stream = page.responses().await?;
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let task = tokio::spawn(async move {
            let mut stream = stream.filter(|r| futures::future::ready(predicate(r)));
            while let Some(response) = stream.next().await {
                let mut buf = match sink.lock() {
                    Ok(b) => b,
                    Err(_) => break,
                };
                if buf.len() >= MAX_OBSERVED_RESPONSES {
                    tracing::debug!("response buffer full, dropping {}", response.url);
                    continue;
                }
                buf.push(response);
            }
        });
        Ok(Self { buffer, task })
    }

    /// Copy of everything captured so far, in arrival order.
    pub fn snapshot(&self) -> Vec<ObservedResponse> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ResponseObserver {
    fn drop(&mut self) {
        self.task.abort();
    }
}
