use std::future::Future;

use crate::error::SyncResult;
use crate::partition::KeyRange;
use crate::types::{BackupRecord, UserRecord};

/// Access to the source table and its backup mirror.
///
/// [`Store`] is the single seam between the synchronization engine and the
/// database holding both tables. Reads are always ordered ascending by id so
/// the partitioner can sample boundaries and the chunk pipeline can stream a
/// range front to back.
///
/// Implementations must make [`Store::write_batch`] an idempotent upsert:
/// repeated runs over an unchanged source must not create duplicate rows or
/// fail on keys that already exist. A concurrent modification detected during
/// a batched write must surface as [`crate::error::ErrorKind::WriteConflict`]
/// so the retry policy can recover it; any other write failure is terminal for
/// the partition.
pub trait Store {
    /// Returns the number of rows in the source table.
    fn count(&self) -> impl Future<Output = SyncResult<u64>> + Send;

    /// Returns the smallest source id, or `None` for an empty table.
    fn min_key(&self) -> impl Future<Output = SyncResult<Option<String>>> + Send;

    /// Returns the largest source id, or `None` for an empty table.
    fn max_key(&self) -> impl Future<Output = SyncResult<Option<String>>> + Send;

    /// Returns the source id at the given 0-based ordinal offset, ascending.
    ///
    /// Returns `None` when the offset runs past the end of the table; the
    /// partitioner treats that as "use the maximum key".
    fn key_at_offset(&self, offset: u64) -> impl Future<Output = SyncResult<Option<String>>> + Send;

    /// Reads one page of source rows in ascending id order.
    ///
    /// `range` scopes the read to a partition; `None` reads the whole table,
    /// which is the contract used by non-partitioned execution modes. Page
    /// numbering is 0-based and relative to the scoped query, not the table.
    fn read_page(
        &self,
        range: Option<&KeyRange>,
        page_number: u64,
        page_size: usize,
    ) -> impl Future<Output = SyncResult<Vec<UserRecord>>> + Send;

    /// Upserts one chunk of transformed rows into the destination table.
    ///
    /// The whole batch commits atomically; a partial write must not be
    /// observable.
    fn write_batch(&self, records: Vec<BackupRecord>)
    -> impl Future<Output = SyncResult<()>> + Send;

    /// Deletes every destination row whose id no longer exists in the source.
    ///
    /// Implemented as one set-difference delete inside a single transaction.
    /// Returns the number of rows removed.
    fn delete_orphans(&self) -> impl Future<Output = SyncResult<u64>> + Send;
}
