use chrono::{TimeZone, Utc};

use crate::store::memory::MemoryStore;
use crate::types::{BackupRecord, UserRecord};

/// Builds a deterministic source row for the given id.
///
/// Timestamps are fixed so tests can assert they are carried over verbatim
/// rather than regenerated at write time.
pub fn user_record(id: &str) -> UserRecord {
    let created_at = Utc.with_ymd_and_hms(2023, 4, 11, 9, 0, 0).unwrap();
    let modified_at = Utc.with_ymd_and_hms(2023, 4, 13, 17, 30, 0).unwrap();

    UserRecord {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        password: format!("hash-{id}"),
        name: format!("name-{id}"),
        nickname: format!("nick-{id}"),
        mobile: "010-0000-0000".to_string(),
        created_at,
        modified_at,
    }
}

/// Builds a mirror row for the given id, for pre-seeding orphans.
pub fn backup_record(id: &str) -> BackupRecord {
    BackupRecord::from_user(&user_record(id))
}

/// Seeds the source table with one row per id.
pub async fn seed_users(store: &MemoryStore, ids: &[&str]) {
    let records = ids.iter().map(|id| user_record(id)).collect();
    store.insert_users(records).await;
}

/// Builds `count` ids with a stable sortable shape (`user-0000`, ...).
pub fn sequential_ids(count: usize) -> Vec<String> {
    (0..count).map(|index| format!("user-{index:04}")).collect()
}
