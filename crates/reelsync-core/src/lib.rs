pub mod config;
pub mod error;
pub mod logging;

pub mod browser;
pub mod collector;
pub mod history;
pub mod naming;
pub mod orchestrator;
pub mod pipeline;
pub mod post;
pub mod resolver;
pub mod retry;
pub mod transfer;
