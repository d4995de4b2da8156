//! Batch Orchestrator: drives collector, history, resolver and transfer
//! engine for each tracked profile.

mod batch;
mod profile;
mod run;

pub use batch::{run_batches, BatchOutcome, ProgressFn};
pub use profile::{filter_new_links, Orchestrator, ProfileReport, ProfileStage};
pub use run::{plan_profiles, ProfilePlan, RunSummary};

#[cfg(test)]
pub(crate) mod testing;
