use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{BatchConfig, RetryConfig, ValidationError};

/// Configuration for a full synchronization job.
///
/// Contains the partitioning grid size, the worker pool bound, and the batch
/// and retry settings shared by every partition pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Requested number of partitions to divide the source key space into.
    ///
    /// The partitioner may produce fewer partitions than requested when the
    /// source table is small.
    #[serde(default = "default_partition_count")]
    pub partition_count: u16,
    /// Maximum number of partition pipelines that can run at the same time.
    #[serde(default = "default_max_partition_workers")]
    pub max_partition_workers: u16,
    /// Paging and chunking configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Write-conflict retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl SyncConfig {
    /// Validates the job configuration and all nested sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.partition_count == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "partition_count",
                constraint: "must be greater than 0",
            });
        }

        if self.max_partition_workers == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "max_partition_workers",
                constraint: "must be greater than 0",
            });
        }

        self.batch.validate()?;
        self.retry.validate()?;

        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            partition_count: default_partition_count(),
            max_partition_workers: default_max_partition_workers(),
            batch: BatchConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config for SyncConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

/// Available hardware parallelism, clamped to the `u16` range.
fn available_parallelism() -> u16 {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(u16::MAX as usize) as u16
}

fn default_partition_count() -> u16 {
    available_parallelism()
}

/// Twice the hardware parallelism, so blocked pipelines leave the cores busy.
fn default_max_partition_workers() -> u16 {
    available_parallelism().saturating_mul(2)
}
