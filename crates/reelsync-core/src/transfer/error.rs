//! Transfer error type used for retry and reporting.

use thiserror::Error;

/// Failure of one fetch attempt. Every variant is retried by the engine;
/// storage failures are reported separately and never retried.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Successful status with a zero-length body.
    #[error("empty response body")]
    EmptyBody,
    /// The blocking fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Join(String),
}
