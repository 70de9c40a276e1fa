use std::time::Duration;

use tablesync_config::shared::RetryConfig;

use crate::error::{ErrorKind, SyncError};

/// Retry settings applied to every chunk commit.
///
/// The policy retries only the write stage of a chunk; reads and transforms
/// run once. `retry_limit` counts additional attempts after the first failed
/// write, so a chunk is tried at most `retry_limit + 1` times, with a fixed
/// backoff sleep between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retry_limit: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy from explicit parts.
    pub fn new(retry_limit: u32, backoff: Duration) -> Self {
        Self {
            retry_limit,
            backoff,
        }
    }

    /// Creates a policy from the shared retry configuration.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.retry_limit, Duration::from_millis(config.backoff_ms))
    }

    /// Maximum number of times one chunk write may be attempted.
    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Fixed delay between attempts.
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Returns whether a failed chunk write is worth repeating.
///
/// Only write conflicts are transient by definition: another writer touched
/// the same rows and the upsert can simply be replayed. Connectivity loss,
/// constraint violations, and everything else are terminal for the partition.
pub fn is_retryable(error: &SyncError) -> bool {
    matches!(error.kind(), ErrorKind::WriteConflict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync_error;

    #[test]
    fn only_write_conflicts_are_retryable() {
        assert!(is_retryable(&sync_error!(
            ErrorKind::WriteConflict,
            "Conflict"
        )));
        assert!(!is_retryable(&sync_error!(
            ErrorKind::StoreUnavailable,
            "Connection lost"
        )));
        assert!(!is_retryable(&sync_error!(
            ErrorKind::DestinationQueryFailed,
            "Constraint violation"
        )));
    }

    #[test]
    fn attempts_are_retry_limit_plus_one() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert_eq!(policy.max_attempts(), 4);

        let none = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(none.max_attempts(), 1);
    }
}
