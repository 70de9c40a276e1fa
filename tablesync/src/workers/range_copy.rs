use std::time::Instant;

use metrics::{counter, histogram};
use tablesync_config::shared::BatchConfig;
use tracing::{debug, info};

use crate::error::SyncResult;
use crate::metrics::{
    PARTITIONED_LABEL, RUN_ID_LABEL, SYNC_CHUNKS_COMMITTED_TOTAL,
    SYNC_CHUNK_COMMIT_DURATION_SECONDS, SYNC_PARTITION_ROWS, SYNC_ROWS_COPIED_TOTAL,
};
use crate::partition::KeyRange;
use crate::store::base::Store;
use crate::types::{BackupRecord, RunId};
use crate::workers::policy::{RetryPolicy, is_retryable};

/// Result of copying one key range through the chunk pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeCopyResult {
    /// Source rows read, transformed, and durably written.
    pub rows_copied: u64,
    /// Number of chunk commits issued.
    pub chunks_committed: u64,
}

/// Streams one key range through the read-transform-write pipeline.
///
/// Source rows are fetched in pages of `batch.page_size`, transformed one by
/// one, and committed in chunks of `batch.chunk_size`. Chunk boundaries do not
/// align with page boundaries; the pipeline interleaves paged reads and
/// chunked writes until the range is exhausted. Within the range, chunks
/// commit strictly in ascending id order.
///
/// `range` is `None` for whole-table modes, which reuse this pipeline without
/// partitioning.
pub async fn copy_range<S: Store>(
    store: &S,
    range: Option<&KeyRange>,
    batch: &BatchConfig,
    retry: &RetryPolicy,
    run_id: RunId,
) -> SyncResult<RangeCopyResult> {
    match range {
        Some(range) => info!(run_id, %range, "starting range copy"),
        None => info!(run_id, "starting whole-table copy"),
    }

    let mut chunk: Vec<BackupRecord> = Vec::with_capacity(batch.chunk_size);
    let mut rows_copied: u64 = 0;
    let mut chunks_committed: u64 = 0;
    let mut page_number: u64 = 0;

    loop {
        let page = store
            .read_page(range, page_number, batch.page_size)
            .await?;
        let page_len = page.len();

        for record in &page {
            chunk.push(BackupRecord::from_user(record));

            if chunk.len() == batch.chunk_size {
                commit_chunk(store, &mut chunk, retry, run_id, range.is_some()).await?;
                chunks_committed += 1;
            }
        }

        rows_copied += page_len as u64;
        page_number += 1;

        // A short page means the scoped query is exhausted.
        if page_len < batch.page_size {
            break;
        }
    }

    if !chunk.is_empty() {
        commit_chunk(store, &mut chunk, retry, run_id, range.is_some()).await?;
        chunks_committed += 1;
    }

    histogram!(
        SYNC_PARTITION_ROWS,
        RUN_ID_LABEL => run_id.to_string(),
        PARTITIONED_LABEL => if range.is_some() { "true" } else { "false" },
    )
    .record(rows_copied as f64);

    match range {
        Some(range) => info!(run_id, %range, rows_copied, chunks_committed, "completed range copy"),
        None => info!(run_id, rows_copied, chunks_committed, "completed whole-table copy"),
    }

    Ok(RangeCopyResult {
        rows_copied,
        chunks_committed,
    })
}

/// Commits one chunk, retrying write conflicts with a fixed backoff.
///
/// The chunk is drained on success. Non-conflict failures and conflict
/// failures that outlive the retry budget propagate to the caller and leave
/// the chunk uncommitted.
async fn commit_chunk<S: Store>(
    store: &S,
    chunk: &mut Vec<BackupRecord>,
    retry: &RetryPolicy,
    run_id: RunId,
    partitioned: bool,
) -> SyncResult<()> {
    let rows = chunk.len() as u64;
    let max_attempts = retry.max_attempts();
    let before_commit = Instant::now();

    let mut attempt: u32 = 1;
    loop {
        match store.write_batch(chunk.clone()).await {
            Ok(()) => break,
            Err(err) if is_retryable(&err) && attempt < max_attempts => {
                debug!(
                    run_id,
                    attempt,
                    max_attempts,
                    "chunk write hit a conflict, backing off before retrying"
                );
                tokio::time::sleep(retry.backoff()).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }

    chunk.clear();

    counter!(
        SYNC_ROWS_COPIED_TOTAL,
        RUN_ID_LABEL => run_id.to_string(),
        PARTITIONED_LABEL => if partitioned { "true" } else { "false" },
    )
    .increment(rows);
    counter!(
        SYNC_CHUNKS_COMMITTED_TOTAL,
        RUN_ID_LABEL => run_id.to_string(),
    )
    .increment(1);
    histogram!(
        SYNC_CHUNK_COMMIT_DURATION_SECONDS,
        RUN_ID_LABEL => run_id.to_string(),
    )
    .record(before_commit.elapsed().as_secs_f64());

    Ok(())
}
