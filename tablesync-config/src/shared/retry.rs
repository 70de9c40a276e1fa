use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Retry configuration for chunk writes that hit a write conflict.
///
/// Only the write stage of a chunk is ever retried; reads and transforms run
/// once per chunk.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Number of additional attempts after the first failed write.
    ///
    /// A chunk write is tried at most `retry_limit + 1` times in total.
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Fixed number of milliseconds to wait between attempts.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl RetryConfig {
    /// Default number of additional write attempts.
    pub const DEFAULT_RETRY_LIMIT: u32 = 3;

    /// Default fixed backoff between attempts, in milliseconds.
    pub const DEFAULT_BACKOFF_MS: u64 = 1000;

    /// Validates retry configuration settings.
    ///
    /// A zero retry limit is accepted and disables retries entirely.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_retry_limit() -> u32 {
    RetryConfig::DEFAULT_RETRY_LIMIT
}

fn default_backoff_ms() -> u64 {
    RetryConfig::DEFAULT_BACKOFF_MS
}
