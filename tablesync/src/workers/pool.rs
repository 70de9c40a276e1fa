use std::sync::Arc;

use tablesync_config::shared::BatchConfig;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::partition::KeyRange;
use crate::store::base::Store;
use crate::sync_error;
use crate::types::RunId;
use crate::workers::policy::RetryPolicy;
use crate::workers::range_copy::{RangeCopyResult, copy_range};

/// One partition pipeline that finished with an error.
#[derive(Debug)]
pub struct PartitionFailure {
    /// The key range the failing pipeline covered, when known.
    ///
    /// `None` only for panicked workers, whose identity is lost with the task.
    pub range: Option<KeyRange>,
    /// The terminal error of the pipeline.
    pub error: SyncError,
}

/// Aggregate result of running every partition pipeline of one plan.
#[derive(Debug, Default)]
pub struct PoolOutcome {
    /// Rows copied across all successful partitions.
    pub rows_copied: u64,
    /// Chunks committed across all successful partitions.
    pub chunks_committed: u64,
    /// Partitions that failed terminally, in completion order.
    pub failures: Vec<PartitionFailure>,
}

impl PoolOutcome {
    /// Returns whether every partition completed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Collapses all partition failures into one aggregated error.
    pub fn into_error(self) -> Option<SyncError> {
        if self.failures.is_empty() {
            return None;
        }

        let errors: Vec<SyncError> = self
            .failures
            .into_iter()
            .map(|failure| failure.error)
            .collect();

        Some(errors.into())
    }
}

/// Bounded-concurrency executor for partition pipelines.
///
/// Runs one [`copy_range`] pipeline per partition, with at most the configured
/// number of pipelines in flight; excess partitions queue until a permit
/// frees. The pool always drains: a failing partition never cancels its
/// siblings, which run to completion or to their own terminal failure.
#[derive(Debug, Clone)]
pub struct PartitionPool {
    permits: Arc<Semaphore>,
}

impl PartitionPool {
    /// Creates a pool allowing `max_workers` concurrent pipelines.
    pub fn new(max_workers: u16) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_workers as usize)),
        }
    }

    /// Runs every partition of the plan and waits for all of them.
    ///
    /// Returns only after each spawned pipeline has completed or failed; the
    /// caller decides how to react to failures via [`PoolOutcome`].
    pub async fn sync_all<S>(
        &self,
        store: &S,
        partitions: &[KeyRange],
        batch: &BatchConfig,
        retry: &RetryPolicy,
        run_id: RunId,
    ) -> PoolOutcome
    where
        S: Store + Clone + Send + Sync + 'static,
    {
        info!(
            run_id,
            partitions = partitions.len(),
            max_workers = self.permits.available_permits(),
            "running partition pipelines"
        );

        let mut join_set: JoinSet<(usize, SyncResult<RangeCopyResult>)> = JoinSet::new();

        for (index, range) in partitions.iter().enumerate() {
            let permits = self.permits.clone();
            let store = store.clone();
            let range = range.clone();
            let batch = batch.clone();
            let retry = *retry;

            join_set.spawn(async move {
                let permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(err) => {
                        return (
                            index,
                            Err(sync_error!(
                                ErrorKind::InvalidState,
                                "Could not acquire a worker permit for a partition pipeline",
                                err.to_string()
                            )),
                        );
                    }
                };

                let result = copy_range(&store, Some(&range), &batch, &retry, run_id).await;
                drop(permit);

                (index, result)
            });
        }

        let mut outcome = PoolOutcome::default();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(result))) => {
                    outcome.rows_copied += result.rows_copied;
                    outcome.chunks_committed += result.chunks_committed;
                    debug!(run_id, partition = index, "partition pipeline completed");
                }
                Ok((index, Err(err))) => {
                    let range = partitions[index].clone();
                    error!(
                        run_id,
                        partition = index,
                        %range,
                        error = %err,
                        "partition pipeline failed"
                    );
                    outcome.failures.push(PartitionFailure {
                        range: Some(range),
                        error: err,
                    });
                }
                Err(join_err) => {
                    if join_err.is_cancelled() {
                        debug!(run_id, "partition pipeline task was cancelled");
                        continue;
                    }

                    error!(run_id, error = %join_err, "partition pipeline panicked");
                    outcome.failures.push(PartitionFailure {
                        range: None,
                        error: sync_error!(
                            ErrorKind::PartitionWorkerPanic,
                            "Partition pipeline task panicked",
                            join_err.to_string()
                        ),
                    });
                }
            }
        }

        outcome
    }
}
