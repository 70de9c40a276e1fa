use tablesync::error::ErrorKind;
use tablesync::job::{RunStage, SyncJob};
use tablesync::store::memory::MemoryStore;
use tablesync::test_utils::data::seed_users;
use tablesync::test_utils::faulty::FaultyStore;
use tablesync_config::shared::{BatchConfig, RetryConfig, SyncConfig};
use tablesync_telemetry::tracing::init_test_tracing;

/// Single-partition configuration where all seeded rows land in one chunk,
/// so the write attempt count maps directly onto the retry policy.
fn single_chunk_config(retry_limit: u32) -> SyncConfig {
    SyncConfig {
        partition_count: 1,
        max_partition_workers: 1,
        batch: BatchConfig {
            page_size: 10,
            chunk_size: 10,
        },
        retry: RetryConfig {
            retry_limit,
            backoff_ms: 5,
        },
    }
}

async fn faulty_store_with_rows() -> (MemoryStore, FaultyStore<MemoryStore>) {
    let memory = MemoryStore::new();
    seed_users(&memory, &["a", "b", "c"]).await;
    (memory.clone(), FaultyStore::wrap(memory))
}

#[tokio::test(flavor = "multi_thread")]
async fn write_conflicts_are_retried_until_the_chunk_commits() {
    init_test_tracing();

    let (memory, store) = faulty_store_with_rows().await;
    store.push_write_faults(ErrorKind::WriteConflict, 2);

    let job = SyncJob::new(store.clone(), single_chunk_config(3)).unwrap();
    let report = job.run().await;

    assert!(report.is_completed());
    assert_eq!(report.rows_copied, 3);
    assert_eq!(store.write_attempts(), 3);
    assert_eq!(memory.mirror_keys().await.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn retry_exhaustion_fails_the_partition() {
    init_test_tracing();

    let (memory, store) = faulty_store_with_rows().await;
    // retry_limit 3 allows 4 attempts in total; queue a conflict for each.
    store.push_write_faults(ErrorKind::WriteConflict, 4);

    let job = SyncJob::new(store.clone(), single_chunk_config(3)).unwrap();
    let report = job.run().await;

    assert_eq!(report.failed_stage(), Some(RunStage::Syncing));
    assert_eq!(store.write_attempts(), 4);
    assert_eq!(report.failed_ranges.len(), 1);
    assert!(memory.mirror_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_conflict_errors_are_not_retried() {
    init_test_tracing();

    let (memory, store) = faulty_store_with_rows().await;
    store.push_write_fault(ErrorKind::StoreUnavailable);

    let job = SyncJob::new(store.clone(), single_chunk_config(3)).unwrap();
    let report = job.run().await;

    assert_eq!(report.failed_stage(), Some(RunStage::Syncing));
    assert_eq!(store.write_attempts(), 1);
    assert!(memory.mirror_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_retry_limit_disables_retries() {
    init_test_tracing();

    let (_, store) = faulty_store_with_rows().await;
    store.push_write_fault(ErrorKind::WriteConflict);

    let job = SyncJob::new(store.clone(), single_chunk_config(0)).unwrap();
    let report = job.run().await;

    assert_eq!(report.failed_stage(), Some(RunStage::Syncing));
    assert_eq!(store.write_attempts(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_recovered_conflict_still_commits_later_chunks() {
    init_test_tracing();

    let memory = MemoryStore::new();
    seed_users(&memory, &["a", "b", "c", "d", "e"]).await;

    let store = FaultyStore::wrap(memory.clone());
    store.push_write_fault(ErrorKind::WriteConflict);

    let config = SyncConfig {
        partition_count: 1,
        max_partition_workers: 1,
        batch: BatchConfig {
            page_size: 2,
            chunk_size: 2,
        },
        retry: RetryConfig {
            retry_limit: 3,
            backoff_ms: 5,
        },
    };

    let job = SyncJob::new(store.clone(), config).unwrap();
    let report = job.run().await;

    assert!(report.is_completed());
    assert_eq!(report.rows_copied, 5);
    // Three chunks (2 + 2 + 1) plus one retried attempt for the first.
    assert_eq!(store.write_attempts(), 4);
    assert_eq!(memory.mirror_keys().await.len(), 5);
}
