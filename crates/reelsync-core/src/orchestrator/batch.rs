//! Run transfers in fixed-size batches.
//!
//! Transfers inside a batch run concurrently; batches run strictly one after
//! another, so at most `batch_size` transfers are in flight.

use futures::future::join_all;
use std::path::Path;

use crate::transfer::{DownloadResult, DownloadTask, Transfer};

/// Called once per finished transfer with `(completed, total, result)`.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(usize, usize, &DownloadResult) + Send);

/// Totals of a batched run plus every result, in task order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub downloaded: usize,
    pub failed: usize,
    pub results: Vec<DownloadResult>,
}

/// Downloads `tasks` into `root` in batches of `batch_size` (0 is treated as 1).
/// A failed transfer never affects the others.
pub async fn run_batches(
    transfer: &dyn Transfer,
    tasks: &[DownloadTask],
    root: &Path,
    batch_size: usize,
    mut on_progress: Option<ProgressFn<'_>>,
) -> BatchOutcome {
    let batch_size = batch_size.max(1);
    let total = tasks.len();
    let mut outcome = BatchOutcome {
        results: Vec::with_capacity(total),
        ..BatchOutcome::default()
    };

    for (index, batch) in tasks.chunks(batch_size).enumerate() {
        tracing::debug!(batch = index + 1, size = batch.len(), "starting batch");
        let results = join_all(batch.iter().map(|task| transfer.transfer(task, root))).await;
        for result in results {
            if result.success {
                outcome.downloaded += 1;
            } else {
                outcome.failed += 1;
            }
            let completed = outcome.results.len() + 1;
            if let Some(cb) = on_progress.as_mut() {
                cb(completed, total, &result);
            }
            outcome.results.push(result);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::{task, FakeTransfer};

    #[tokio::test]
    async fn failed_transfer_does_not_affect_batch() {
        let transfer = FakeTransfer::failing(&["B"]);
        let tasks = vec![task("A"), task("B"), task("C")];
        let mut calls = Vec::new();
        let mut cb = |done: usize, total: usize, r: &DownloadResult| {
            calls.push((done, total, r.short_code.clone(), r.success));
        };
        let outcome = run_batches(&transfer, &tasks, Path::new("/tmp"), 3, Some(&mut cb)).await;

        assert_eq!(outcome.downloaded, 2);
        assert_eq!(outcome.failed, 1);
        assert_eq!(
            calls,
            vec![
                (1, 3, "A".to_string(), true),
                (2, 3, "B".to_string(), false),
                (3, 3, "C".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn batches_bound_concurrency() {
        let transfer = FakeTransfer::default();
        let tasks: Vec<_> = ["A", "B", "C", "D", "E"].iter().map(|c| task(c)).collect();
        let outcome = run_batches(&transfer, &tasks, Path::new("/tmp"), 2, None).await;
        assert_eq!(outcome.downloaded, 5);
        assert_eq!(outcome.results.len(), 5);
        assert_eq!(transfer.max_in_flight(), 2);
        let order: Vec<_> = outcome.results.iter().map(|r| r.short_code.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D", "E"]);
    }

    #[tokio::test]
    async fn zero_batch_size_runs_sequentially() {
        let transfer = FakeTransfer::default();
        let tasks = vec![task("A"), task("B")];
        let outcome = run_batches(&transfer, &tasks, Path::new("/tmp"), 0, None).await;
        assert_eq!(outcome.downloaded, 2);
        assert_eq!(transfer.max_in_flight(), 1);
    }

    #[tokio::test]
    async fn empty_task_list() {
        let transfer = FakeTransfer::default();
        let outcome = run_batches(&transfer, &[], Path::new("/tmp"), 3, None).await;
        assert_eq!(outcome, BatchOutcome::default());
    }
}
