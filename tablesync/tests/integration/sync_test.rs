use tablesync::error::ErrorKind;
use tablesync::job::{RunStage, SyncJob, run_sync};
use tablesync::store::memory::MemoryStore;
use tablesync::test_utils::data::{backup_record, seed_users, sequential_ids, user_record};
use tablesync::test_utils::faulty::FaultyStore;
use tablesync_config::shared::{BatchConfig, RetryConfig, SyncConfig};
use tablesync_telemetry::tracing::init_test_tracing;

/// A small configuration that exercises paging, chunking and parallelism.
fn test_config(partition_count: u16, page_size: usize, chunk_size: usize) -> SyncConfig {
    SyncConfig {
        partition_count,
        max_partition_workers: 2,
        batch: BatchConfig {
            page_size,
            chunk_size,
        },
        retry: RetryConfig {
            retry_limit: 3,
            backoff_ms: 5,
        },
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn full_sync_copies_all_rows_and_removes_orphans() {
    init_test_tracing();

    let store = MemoryStore::new();
    seed_users(&store, &["a", "b", "c", "d", "e", "f"]).await;
    store.seed_mirror(backup_record("z")).await;

    let report = run_sync(store.clone(), 2, 2, 2, 3).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(report.partitions, 2);
    assert_eq!(report.rows_copied, 6);
    assert_eq!(report.rows_reconciled, 1);
    assert!(report.failed_ranges.is_empty());

    assert_eq!(store.mirror_keys().await, store.source_keys().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn synced_rows_carry_source_values_verbatim() {
    init_test_tracing();

    let store = MemoryStore::new();
    seed_users(&store, &["a", "b"]).await;

    let report = run_sync(store.clone(), 1, 10, 10, 3).await.unwrap();
    assert!(report.is_completed());

    let expected = user_record("a");
    let rows = store.mirror_rows().await;
    let row = rows.iter().find(|row| row.id == "a").unwrap();

    assert_eq!(row.email, expected.email);
    assert_eq!(row.password, expected.password);
    assert_eq!(row.name, expected.name);
    assert_eq!(row.nickname, expected.nickname);
    assert_eq!(row.mobile, expected.mobile);
    assert_eq!(row.created_at, expected.created_at);
    assert_eq!(row.modified_at, expected.modified_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn running_twice_converges_to_the_same_mirror() {
    init_test_tracing();

    let store = MemoryStore::new();
    let ids = sequential_ids(25);
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    seed_users(&store, &id_refs).await;

    let first = run_sync(store.clone(), 4, 3, 5, 3).await.unwrap();
    let second = run_sync(store.clone(), 4, 3, 5, 3).await.unwrap();

    assert!(first.is_completed());
    assert!(second.is_completed());
    assert_eq!(second.rows_copied, 25);
    assert!(second.run_id > first.run_id);

    assert_eq!(store.mirror_keys().await, ids);
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_after_source_deletions_drops_the_orphans() {
    init_test_tracing();

    let store = MemoryStore::new();
    let ids = sequential_ids(10);
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    seed_users(&store, &id_refs).await;

    run_sync(store.clone(), 2, 4, 4, 3).await.unwrap();

    assert!(store.delete_user("user-0003").await);
    assert!(store.delete_user("user-0007").await);

    let report = run_sync(store.clone(), 2, 4, 4, 3).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(report.rows_reconciled, 2);
    assert_eq!(store.mirror_keys().await, store.source_keys().await);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_source_empties_the_mirror() {
    init_test_tracing();

    let store = MemoryStore::new();
    store.seed_mirror(backup_record("a")).await;
    store.seed_mirror(backup_record("b")).await;

    let report = run_sync(store.clone(), 4, 10, 10, 3).await.unwrap();

    assert!(report.is_completed());
    assert_eq!(report.partitions, 0);
    assert_eq!(report.rows_copied, 0);
    assert_eq!(report.rows_reconciled, 2);
    assert!(store.mirror_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn partition_failure_skips_reconciliation() {
    init_test_tracing();

    let memory = MemoryStore::new();
    seed_users(&memory, &["a", "b", "c", "d", "e", "f"]).await;
    memory.seed_mirror(backup_record("z")).await;

    let store = FaultyStore::wrap(memory.clone());
    store.push_write_fault(ErrorKind::StoreUnavailable);

    let job = SyncJob::new(store.clone(), test_config(2, 2, 2)).unwrap();
    let report = job.run().await;

    assert!(!report.is_completed());
    assert_eq!(report.failed_stage(), Some(RunStage::Syncing));
    assert_eq!(report.failed_ranges.len(), 1);
    assert_eq!(report.rows_reconciled, 0);

    // The orphan must survive: some ranges never landed, so deleting
    // destination rows now would discard data that is still live upstream.
    assert!(memory.mirror_keys().await.contains(&"z".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn sibling_partitions_finish_when_one_fails() {
    init_test_tracing();

    let memory = MemoryStore::new();
    seed_users(&memory, &["a", "b", "c", "d", "e", "f"]).await;

    let store = FaultyStore::wrap(memory.clone());
    store.push_write_fault(ErrorKind::StoreUnavailable);

    let job = SyncJob::new(store.clone(), test_config(2, 2, 2)).unwrap();
    let report = job.run().await;

    assert_eq!(report.failed_stage(), Some(RunStage::Syncing));
    assert_eq!(report.partitions, 2);
    assert_eq!(report.failed_ranges.len(), 1);

    // The failed range covers part of the key space; the surviving partition
    // still committed its rows.
    let failed = &report.failed_ranges[0];
    for id in memory.mirror_keys().await {
        assert!(!failed.contains(&id), "row {id} landed from the failed range");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn zero_partition_count_is_rejected_at_construction() {
    init_test_tracing();

    let store = MemoryStore::new();
    let error = SyncJob::new(store, test_config(0, 10, 10)).unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ConfigError);
}
