//! Record types moved between the source and destination tables.

use chrono::{DateTime, Utc};

/// Identity of one synchronization run.
///
/// Run identities are monotonically increasing so the same job definition can
/// be launched repeatedly without two runs ever sharing an identity.
pub type RunId = u64;

/// A row of the source table.
///
/// The `id` is the partition key: globally unique, immutable, and ordered
/// lexicographically. All other fields are opaque to the synchronization
/// engine and are carried to the destination unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub mobile: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A row of the destination (backup) table.
///
/// Field-for-field mirror of [`UserRecord`]. Timestamps are copied verbatim
/// from the source row, never regenerated at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
    pub mobile: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl BackupRecord {
    /// Pure transform from a source row to its destination shape.
    ///
    /// This is the processor stage of the chunk pipeline; it has no side
    /// effects and copies every field unchanged.
    pub fn from_user(user: &UserRecord) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            password: user.password.clone(),
            name: user.name.clone(),
            nickname: user.nickname.clone(),
            mobile: user.mobile.clone(),
            created_at: user.created_at,
            modified_at: user.modified_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_copies_every_field_verbatim() {
        let created_at = Utc::now();
        let modified_at = Utc::now();
        let user = UserRecord {
            id: "user-0001".into(),
            email: "a@example.com".into(),
            password: "hash".into(),
            name: "A".into(),
            nickname: "a".into(),
            mobile: "010-0000-0000".into(),
            created_at,
            modified_at,
        };

        let backup = BackupRecord::from_user(&user);

        assert_eq!(backup.id, user.id);
        assert_eq!(backup.email, user.email);
        assert_eq!(backup.created_at, created_at);
        assert_eq!(backup.modified_at, modified_at);
    }
}
