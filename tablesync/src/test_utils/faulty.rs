use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ErrorKind, SyncResult};
use crate::partition::KeyRange;
use crate::store::base::Store;
use crate::sync_error;
use crate::types::{BackupRecord, UserRecord};

/// Store wrapper that injects scripted write failures.
///
/// Wraps any [`Store`] and fails `write_batch` with the next queued
/// [`ErrorKind`] before delegating, which is how tests exercise the conflict
/// retry loop and the non-retryable failure paths without a real concurrent
/// writer. Reads always delegate untouched.
#[derive(Debug, Clone)]
pub struct FaultyStore<S> {
    inner: S,
    write_faults: Arc<Mutex<VecDeque<ErrorKind>>>,
    write_attempts: Arc<AtomicU32>,
}

impl<S> FaultyStore<S> {
    /// Wraps a store with no faults queued.
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            write_faults: Arc::new(Mutex::new(VecDeque::new())),
            write_attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Queues one injected failure for an upcoming `write_batch` call.
    pub fn push_write_fault(&self, kind: ErrorKind) {
        self.write_faults.lock().unwrap().push_back(kind);
    }

    /// Queues the same injected failure `count` times.
    pub fn push_write_faults(&self, kind: ErrorKind, count: u32) {
        let mut faults = self.write_faults.lock().unwrap();
        for _ in 0..count {
            faults.push_back(kind);
        }
    }

    /// Number of `write_batch` calls observed, including failed ones.
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

impl<S> Store for FaultyStore<S>
where
    S: Store + Send + Sync,
{
    async fn count(&self) -> SyncResult<u64> {
        self.inner.count().await
    }

    async fn min_key(&self) -> SyncResult<Option<String>> {
        self.inner.min_key().await
    }

    async fn max_key(&self) -> SyncResult<Option<String>> {
        self.inner.max_key().await
    }

    async fn key_at_offset(&self, offset: u64) -> SyncResult<Option<String>> {
        self.inner.key_at_offset(offset).await
    }

    async fn read_page(
        &self,
        range: Option<&KeyRange>,
        page_number: u64,
        page_size: usize,
    ) -> SyncResult<Vec<UserRecord>> {
        self.inner.read_page(range, page_number, page_size).await
    }

    async fn write_batch(&self, records: Vec<BackupRecord>) -> SyncResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);

        let fault = self.write_faults.lock().unwrap().pop_front();
        if let Some(kind) = fault {
            return Err(sync_error!(kind, "Injected write failure"));
        }

        self.inner.write_batch(records).await
    }

    async fn delete_orphans(&self) -> SyncResult<u64> {
        self.inner.delete_orphans().await
    }
}
