//! The synchronization job orchestrator.
//!
//! Sequences one run as Partitioning → Syncing → Reconciling, tags it with a
//! fresh run identity, and reports the failing stage when a run does not
//! complete. A run never resumes a prior failed run's partial progress: every
//! run re-partitions against current table contents and redoes affected work.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tablesync_config::shared::{BatchConfig, RetryConfig, SyncConfig};
use tracing::{error, info};

use crate::error::{ErrorKind, SyncError, SyncResult};
use crate::partition::{KeyRange, plan_partitions};
use crate::reconcile::reconcile_orphans;
use crate::store::base::Store;
use crate::sync_error;
use crate::types::RunId;
use crate::workers::policy::RetryPolicy;
use crate::workers::pool::PartitionPool;

/// Process-wide run identity sequence.
///
/// Monotonically increasing so repeated launches of the same job value never
/// share an identity, which is what allows re-running a failed job instead of
/// resuming it.
static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// The stage a run was executing when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Computing partition boundaries.
    Partitioning,
    /// Running partition pipelines.
    Syncing,
    /// Deleting orphaned destination rows.
    Reconciling,
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStage::Partitioning => "partitioning",
            RunStage::Syncing => "syncing",
            RunStage::Reconciling => "reconciling",
        };
        f.write_str(name)
    }
}

/// Terminal status of one run.
#[derive(Debug)]
pub enum RunStatus {
    /// Every partition synced and reconciliation finished.
    Completed,
    /// The run stopped at `stage` with `error`.
    Failed { stage: RunStage, error: SyncError },
}

/// Summary of one synchronization run.
#[derive(Debug)]
pub struct RunReport {
    /// Identity of this run.
    pub run_id: RunId,
    /// Number of partitions the plan produced.
    pub partitions: usize,
    /// Rows copied by partitions that completed.
    pub rows_copied: u64,
    /// Orphaned destination rows removed by reconciliation.
    pub rows_reconciled: u64,
    /// Key ranges of partitions that failed, for a targeted re-run.
    pub failed_ranges: Vec<KeyRange>,
    /// Terminal status of the run.
    pub status: RunStatus,
}

impl RunReport {
    /// Returns whether the run completed.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, RunStatus::Completed)
    }

    /// Returns the failing stage, if the run failed.
    pub fn failed_stage(&self) -> Option<RunStage> {
        match &self.status {
            RunStatus::Completed => None,
            RunStatus::Failed { stage, .. } => Some(*stage),
        }
    }
}

/// Orchestrator for one table synchronization job.
///
/// Owns the store handle and configuration for the lifetime of the job; each
/// [`SyncJob::run`] call is an independent run with a fresh identity.
/// Collaborators are injected at construction time.
#[derive(Debug, Clone)]
pub struct SyncJob<S> {
    store: S,
    config: Arc<SyncConfig>,
}

impl<S> SyncJob<S>
where
    S: Store + Clone + Send + Sync + 'static,
{
    /// Creates a job after validating its configuration.
    pub fn new(store: S, config: SyncConfig) -> SyncResult<Self> {
        config.validate().map_err(|err| {
            sync_error!(
                ErrorKind::ConfigError,
                "Invalid synchronization configuration",
                source: err
            )
        })?;

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// Executes one run and returns its report.
    ///
    /// Reconciliation only runs when every partition succeeded; deleting
    /// destination rows while some ranges were never written would discard
    /// data that is still live upstream.
    pub async fn run(&self) -> RunReport {
        let run_id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);

        info!(run_id, "starting synchronization run");

        let partitions =
            match plan_partitions(&self.store, self.config.partition_count).await {
                Ok(partitions) => partitions,
                Err(err) => {
                    error!(run_id, error = %err, "partition planning failed");
                    return RunReport {
                        run_id,
                        partitions: 0,
                        rows_copied: 0,
                        rows_reconciled: 0,
                        failed_ranges: Vec::new(),
                        status: RunStatus::Failed {
                            stage: RunStage::Partitioning,
                            error: err,
                        },
                    };
                }
            };

        info!(run_id, partitions = partitions.len(), "partition plan ready");

        let pool = PartitionPool::new(self.config.max_partition_workers);
        let retry = RetryPolicy::from_config(&self.config.retry);
        let outcome = pool
            .sync_all(&self.store, &partitions, &self.config.batch, &retry, run_id)
            .await;

        let rows_copied = outcome.rows_copied;

        if !outcome.is_success() {
            let failed_ranges: Vec<KeyRange> = outcome
                .failures
                .iter()
                .filter_map(|failure| failure.range.clone())
                .collect();

            error!(
                run_id,
                failed = outcome.failures.len(),
                "one or more partitions failed, skipping reconciliation"
            );

            let error = outcome
                .into_error()
                .unwrap_or_else(|| sync_error!(ErrorKind::Unknown, "Partition failure lost"));

            return RunReport {
                run_id,
                partitions: partitions.len(),
                rows_copied,
                rows_reconciled: 0,
                failed_ranges,
                status: RunStatus::Failed {
                    stage: RunStage::Syncing,
                    error,
                },
            };
        }

        // Reconciliation also runs for an empty plan: with an empty source,
        // every destination row is an orphan.
        let rows_reconciled = match reconcile_orphans(&self.store, run_id).await {
            Ok(removed) => removed,
            Err(err) => {
                // All data already landed; the tables are synced but not cleaned.
                error!(run_id, error = %err, "reconciliation failed");
                return RunReport {
                    run_id,
                    partitions: partitions.len(),
                    rows_copied,
                    rows_reconciled: 0,
                    failed_ranges: Vec::new(),
                    status: RunStatus::Failed {
                        stage: RunStage::Reconciling,
                        error: err,
                    },
                };
            }
        };

        info!(
            run_id,
            rows_copied, rows_reconciled, "synchronization run completed"
        );

        RunReport {
            run_id,
            partitions: partitions.len(),
            rows_copied,
            rows_reconciled,
            failed_ranges: Vec::new(),
            status: RunStatus::Completed,
        }
    }
}

/// Runs one synchronization with explicit knobs, using defaults for the rest.
///
/// Convenience entry point over [`SyncJob`] for callers that do not load a
/// configuration file.
pub async fn run_sync<S>(
    store: S,
    partition_count: u16,
    page_size: usize,
    chunk_size: usize,
    retry_limit: u32,
) -> SyncResult<RunReport>
where
    S: Store + Clone + Send + Sync + 'static,
{
    let config = SyncConfig {
        partition_count,
        batch: BatchConfig {
            page_size,
            chunk_size,
        },
        retry: RetryConfig {
            retry_limit,
            ..RetryConfig::default()
        },
        ..SyncConfig::default()
    };

    let job = SyncJob::new(store, config)?;

    Ok(job.run().await)
}
