use tablesync::partition::plan_partitions;
use tablesync::store::memory::MemoryStore;
use tablesync::test_utils::data::{seed_users, sequential_ids};
use tablesync_telemetry::tracing::init_test_tracing;

async fn store_with_ids(ids: &[String]) -> MemoryStore {
    let store = MemoryStore::new();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    seed_users(&store, &id_refs).await;
    store
}

#[tokio::test(flavor = "multi_thread")]
async fn partitions_are_disjoint_ascending_and_cover_key_space() {
    init_test_tracing();

    let ids = sequential_ids(100);
    let store = store_with_ids(&ids).await;

    let partitions = plan_partitions(&store, 4).await.unwrap();

    assert!(!partitions.is_empty());
    assert!(partitions.len() <= 4);

    let first = partitions.first().unwrap();
    let last = partitions.last().unwrap();
    assert_eq!(first.start, "user-0000");
    assert_eq!(last.end, "user-0099");
    assert!(last.is_last);

    for pair in partitions.windows(2) {
        // Contiguous and strictly ascending.
        assert_eq!(pair[0].end, pair[1].start);
        assert!(pair[0].start < pair[0].end);
        assert!(!pair[0].is_last);
    }

    // Every key belongs to exactly one partition.
    for id in &ids {
        let owners = partitions
            .iter()
            .filter(|partition| partition.contains(id))
            .count();
        assert_eq!(owners, 1, "key {id} owned by {owners} partitions");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn six_keys_with_grid_two_split_at_the_sampled_boundary() {
    init_test_tracing();

    let store = MemoryStore::new();
    seed_users(&store, &["a", "b", "c", "d", "e", "f"]).await;

    let partitions = plan_partitions(&store, 2).await.unwrap();

    assert_eq!(partitions.len(), 2);

    assert_eq!(partitions[0].start, "a");
    assert_eq!(partitions[0].end, "c");
    assert!(!partitions[0].is_last);

    assert_eq!(partitions[1].start, "c");
    assert_eq!(partitions[1].end, "f");
    assert!(partitions[1].is_last);
}

#[tokio::test(flavor = "multi_thread")]
async fn grid_larger_than_row_count_collapses_to_one_partition() {
    init_test_tracing();

    let store = MemoryStore::new();
    seed_users(&store, &["a", "b", "c"]).await;

    let partitions = plan_partitions(&store, 8).await.unwrap();

    assert_eq!(partitions.len(), 1);
    assert_eq!(partitions[0].start, "a");
    assert_eq!(partitions[0].end, "c");
    assert!(partitions[0].is_last);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_source_yields_an_empty_plan() {
    init_test_tracing();

    let store = MemoryStore::new();

    let partitions = plan_partitions(&store, 4).await.unwrap();

    assert!(partitions.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn plan_never_exceeds_the_requested_grid_size() {
    init_test_tracing();

    // 7 rows with grid 2 leaves a remainder after sampling at stride 3; the
    // plan must absorb it into the last partition instead of adding a third.
    let ids = sequential_ids(7);
    let store = store_with_ids(&ids).await;

    let partitions = plan_partitions(&store, 2).await.unwrap();

    assert_eq!(partitions.len(), 2);
    assert_eq!(partitions.last().unwrap().end, "user-0006");
    assert!(partitions.last().unwrap().is_last);
}
