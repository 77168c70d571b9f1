//! Schema migration policy
//!
//! The store only knows one migration strategy today: throw everything away
//! and recreate it. It sits behind [`Migrator`] so an incremental strategy
//! can be plugged into [`crate::database::StoreHandle`] later without
//! touching callers.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{StoreError, StoreResult};
use super::schema::SchemaManager;

/// Brings an existing store from one schema version to another
///
/// Implementations run inside the transaction opened by the store handle,
/// which stamps the new version only after they return `Ok`.
pub trait Migrator: Send + Sync {
    /// Stored version is older than the expected version
    fn upgrade(&self, conn: &Connection, from: u32, to: u32) -> StoreResult<()>;

    /// Stored version is newer than the expected version
    fn downgrade(&self, conn: &Connection, from: u32, to: u32) -> StoreResult<()>;
}

/// What to do when the store was written by a newer build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DowngradePolicy {
    /// Fail with [`StoreError::Downgrade`] and leave the store untouched
    #[default]
    Refuse,
    /// Drop and recreate all tables, same as an upgrade
    Recreate,
}

/// Drop-and-recreate migrator
///
/// Every upgrade loses all cached rows. This is accepted: the store is a
/// cache of remote data and repopulates on the next sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct DestructiveMigrator {
    pub downgrade: DowngradePolicy,
}

impl DestructiveMigrator {
    pub fn new(downgrade: DowngradePolicy) -> Self {
        Self { downgrade }
    }
}

impl Migrator for DestructiveMigrator {
    fn upgrade(&self, conn: &Connection, from: u32, to: u32) -> StoreResult<()> {
        SchemaManager::new(conn).on_upgrade(from, to)
    }

    fn downgrade(&self, conn: &Connection, from: u32, to: u32) -> StoreResult<()> {
        match self.downgrade {
            DowngradePolicy::Refuse => Err(StoreError::Downgrade {
                stored: from,
                expected: to,
            }),
            DowngradePolicy::Recreate => {
                warn!(
                    "Downgrading database from version {} to {}, which will destroy all old data",
                    from, to
                );
                SchemaManager::new(conn).recreate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuse_downgrade() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = DestructiveMigrator::default();

        let err = migrator.downgrade(&conn, 49, 48).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Downgrade {
                stored: 49,
                expected: 48
            }
        ));
    }

    #[test]
    fn test_recreate_downgrade() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaManager::new(&conn).on_create().unwrap();
        conn.execute("INSERT INTO revocations (serial, until) VALUES ('abc', 1)", [])
            .unwrap();

        let migrator = DestructiveMigrator::new(DowngradePolicy::Recreate);
        migrator.downgrade(&conn, 49, 48).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM revocations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_upgrade_from_empty_store() {
        let conn = Connection::open_in_memory().unwrap();
        DestructiveMigrator::default()
            .upgrade(&conn, 1, 48)
            .unwrap();
        assert!(SchemaManager::new(&conn).verify_integrity().unwrap());
    }

    #[test]
    fn test_policy_serde() {
        let policy: DowngradePolicy = serde_json::from_str("\"recreate\"").unwrap();
        assert_eq!(policy, DowngradePolicy::Recreate);
        assert_eq!(
            serde_json::to_string(&DowngradePolicy::Refuse).unwrap(),
            "\"refuse\""
        );
    }
}
