//! Error types shared across the pipeline.
//!
//! Environmental failures (navigation, transfers) are folded into result
//! objects by each component. `CoreError` is what escapes to callers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation that needs a live browser session was called before `launch`.
    #[error("{0} called before the browser session was launched")]
    NotInitialized(&'static str),

    /// Browser process or CDP failure that could not be handled locally.
    #[error("browser: {0}")]
    Browser(String),

    #[error("config: {0}")]
    Config(String),

    #[error("history: {0}")]
    History(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for CoreError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        CoreError::Browser(e.to_string())
    }
}
