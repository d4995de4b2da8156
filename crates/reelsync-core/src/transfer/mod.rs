//! Transfer Engine: fetches a resolved asset with retry and stores it under
//! `{root}/{handle}/{stem}_{shortCode}.{ext}`.

mod error;
mod http;
mod storage;

pub use error::TransferError;
pub use http::{fetch, FetchOptions};
pub use storage::{temp_path, write_atomically, TEMP_SUFFIX};

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::naming;
use crate::retry::{run_with_retry, RetryPolicy};

/// One asset to download for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub asset_url: String,
    pub owner_handle: String,
    pub short_code: String,
    pub caption: Option<String>,
}

impl DownloadTask {
    /// Final filename, derived from caption, shortcode and asset URL.
    pub fn file_name(&self) -> String {
        naming::file_name(self.caption.as_deref(), &self.short_code, &self.asset_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub success: bool,
    pub short_code: String,
    pub file_path: Option<PathBuf>,
    /// Bytes written, on success.
    pub size: Option<u64>,
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn downloaded(short_code: &str, file_path: PathBuf, size: u64) -> Self {
        Self {
            success: true,
            short_code: short_code.to_string(),
            file_path: Some(file_path),
            size: Some(size),
            error: None,
        }
    }

    pub fn failed(short_code: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            short_code: short_code.to_string(),
            file_path: None,
            size: None,
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait Transfer: Send + Sync {
    /// Never fails: errors are reported in the result.
    async fn transfer(&self, task: &DownloadTask, root: &Path) -> DownloadResult;
}

pub struct TransferEngine {
    policy: RetryPolicy,
    options: FetchOptions,
}

impl TransferEngine {
    pub fn new(policy: RetryPolicy, options: FetchOptions) -> Self {
        Self { policy, options }
    }

    async fn fetch_with_retry(&self, task: &DownloadTask) -> Result<Vec<u8>, TransferError> {
        run_with_retry(&self.policy, |attempt| {
            let url = task.asset_url.clone();
            let opts = self.options.clone();
            let short_code = task.short_code.clone();
            async move {
                tracing::debug!(short_code = %short_code, attempt, "fetching asset");
                match tokio::task::spawn_blocking(move || fetch(&url, &opts)).await {
                    Ok(res) => res,
                    Err(e) => Err(TransferError::Join(e.to_string())),
                }
            }
        })
        .await
    }
}

#[async_trait]
impl Transfer for TransferEngine {
    async fn transfer(&self, task: &DownloadTask, root: &Path) -> DownloadResult {
        let bytes = match self.fetch_with_retry(task).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(
                    handle = %task.owner_handle,
                    short_code = %task.short_code,
                    "transfer failed after {} attempts: {}",
                    self.policy.max_attempts,
                    e
                );
                return DownloadResult::failed(&task.short_code, e.to_string());
            }
        };

        let dir = root.join(&task.owner_handle);
        let name = task.file_name();
        match write_atomically(&dir, &name, &bytes).await {
            Ok(path) => {
                tracing::info!(
                    handle = %task.owner_handle,
                    short_code = %task.short_code,
                    size = bytes.len(),
                    "saved {}",
                    path.display()
                );
                DownloadResult::downloaded(&task.short_code, path, bytes.len() as u64)
            }
            Err(e) => {
                tracing::warn!(short_code = %task.short_code, "storage error: {}", e);
                DownloadResult::failed(&task.short_code, format!("storage: {e}"))
            }
        }
    }
}
