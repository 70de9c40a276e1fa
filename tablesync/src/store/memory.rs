use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SyncResult;
use crate::partition::KeyRange;
use crate::store::base::Store;
use crate::types::{BackupRecord, UserRecord};

#[derive(Debug, Default)]
struct Inner {
    source: BTreeMap<String, UserRecord>,
    mirror: BTreeMap<String, BackupRecord>,
}

/// In-memory store for testing and development purposes.
///
/// [`MemoryStore`] keeps both the source table and its mirror in ordered maps
/// under a single lock, which also gives `delete_orphans` its one-transaction
/// semantics. All data is lost when the process terminates.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates a new store with empty source and mirror tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces one source row.
    pub async fn insert_user(&self, record: UserRecord) {
        let mut inner = self.inner.lock().await;
        inner.source.insert(record.id.clone(), record);
    }

    /// Inserts or replaces a batch of source rows.
    pub async fn insert_users(&self, records: Vec<UserRecord>) {
        let mut inner = self.inner.lock().await;
        for record in records {
            inner.source.insert(record.id.clone(), record);
        }
    }

    /// Removes one source row, returning whether it existed.
    pub async fn delete_user(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        inner.source.remove(id).is_some()
    }

    /// Inserts one mirror row directly, bypassing the sync pipeline.
    ///
    /// Useful for pre-seeding orphaned destination rows in tests.
    pub async fn seed_mirror(&self, record: BackupRecord) {
        let mut inner = self.inner.lock().await;
        inner.mirror.insert(record.id.clone(), record);
    }

    /// Returns all mirror rows in ascending id order.
    pub async fn mirror_rows(&self) -> Vec<BackupRecord> {
        let inner = self.inner.lock().await;
        inner.mirror.values().cloned().collect()
    }

    /// Returns all mirror ids in ascending order.
    pub async fn mirror_keys(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.mirror.keys().cloned().collect()
    }

    /// Returns all source ids in ascending order.
    pub async fn source_keys(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner.source.keys().cloned().collect()
    }
}

impl Store for MemoryStore {
    async fn count(&self) -> SyncResult<u64> {
        let inner = self.inner.lock().await;
        Ok(inner.source.len() as u64)
    }

    async fn min_key(&self) -> SyncResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.source.keys().next().cloned())
    }

    async fn max_key(&self) -> SyncResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.source.keys().next_back().cloned())
    }

    async fn key_at_offset(&self, offset: u64) -> SyncResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.source.keys().nth(offset as usize).cloned())
    }

    async fn read_page(
        &self,
        range: Option<&KeyRange>,
        page_number: u64,
        page_size: usize,
    ) -> SyncResult<Vec<UserRecord>> {
        let inner = self.inner.lock().await;

        let page = inner
            .source
            .values()
            .filter(|record| range.is_none_or(|range| range.contains(&record.id)))
            .skip(page_number as usize * page_size)
            .take(page_size)
            .cloned()
            .collect();

        Ok(page)
    }

    async fn write_batch(&self, records: Vec<BackupRecord>) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;

        debug!(rows = records.len(), "upserting batch into mirror table");

        for record in records {
            inner.mirror.insert(record.id.clone(), record);
        }

        Ok(())
    }

    async fn delete_orphans(&self) -> SyncResult<u64> {
        let mut inner = self.inner.lock().await;

        let Inner { source, mirror } = &mut *inner;

        let before = mirror.len();
        mirror.retain(|id, _| source.contains_key(id));

        let removed = (before - mirror.len()) as u64;
        debug!(removed, "deleted orphaned mirror rows");

        Ok(removed)
    }
}
