//! Retry and backoff policy.
//!
//! A policy decides how long to wait before the next attempt; `run_with_retry`
//! drives any fallible async operation with it, independent of what the
//! operation does.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy};
pub use run::run_with_retry;
