//! A whole run: every selected profile, one after another.

use super::batch::ProgressFn;
use super::profile::{Orchestrator, ProfileReport};
use crate::config::{normalize_handle, AppConfig};

/// A profile selected for this run and how many posts to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePlan {
    pub handle: String,
    pub max_count: usize,
}

/// Profiles to sync: every enabled user, or only `only` (tracked or not,
/// enabled or not). `max_override` replaces per-user limits.
pub fn plan_profiles(
    cfg: &AppConfig,
    only: Option<&str>,
    max_override: Option<usize>,
) -> Vec<ProfilePlan> {
    let plan = |handle: String, max: usize| ProfilePlan {
        handle,
        max_count: max_override.unwrap_or(max),
    };
    match only {
        Some(handle) => match cfg.find_user(handle) {
            Some(user) => vec![plan(user.handle.clone(), cfg.max_videos_for(user))],
            None => {
                let handle = normalize_handle(handle);
                if handle.is_empty() {
                    return Vec::new();
                }
                vec![plan(handle, cfg.default_max_videos)]
            }
        },
        None => cfg
            .enabled_users()
            .map(|u| plan(u.handle.clone(), cfg.max_videos_for(u)))
            .collect(),
    }
}

/// Aggregated outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub profiles: Vec<ProfileReport>,
    /// Profiles that aborted, with the reason.
    pub failed_profiles: Vec<(String, String)>,
}

impl RunSummary {
    pub fn downloaded(&self) -> usize {
        self.profiles.iter().map(|p| p.downloaded).sum()
    }

    pub fn failed(&self) -> usize {
        self.profiles.iter().map(|p| p.failed + p.resolve_failed).sum()
    }

    pub fn bytes(&self) -> u64 {
        self.profiles.iter().map(|p| p.bytes).sum()
    }
}

impl Orchestrator<'_> {
    /// Syncs each planned profile in order. A failing profile is logged and
    /// the run continues with the next one.
    pub async fn sync_all(
        &self,
        plans: &[ProfilePlan],
        mut on_progress: Option<ProgressFn<'_>>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        for plan in plans {
            let progress: Option<ProgressFn<'_>> = match on_progress.as_mut() {
                Some(cb) => Some(&mut **cb),
                None => None,
            };
            match self.sync_profile(&plan.handle, plan.max_count, progress).await {
                Ok(report) => summary.profiles.push(report),
                Err(e) => {
                    tracing::error!(handle = %plan.handle, "profile failed: {}", e);
                    summary.failed_profiles.push((plan.handle.clone(), e.to_string()));
                }
            }
        }
        tracing::info!(
            profiles = summary.profiles.len(),
            failed_profiles = summary.failed_profiles.len(),
            downloaded = summary.downloaded(),
            failed = summary.failed(),
            "run finished"
        );
        summary
    }
}
