//! Database connection management
//!
//! This module provides the SQLite connection wrapper shared by the schema
//! manager and the store handle.

use std::time::Duration;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};

use super::error::{StoreError, StoreResult};

/// How long a connection waits on a locked database before giving up
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around SQLite connections,
/// handling both file-based and in-memory databases with consistent
/// configuration and error handling.
pub struct DatabaseConn {
    pub conn: Connection,
}

impl DatabaseConn {
    /// Open a database at the specified path
    ///
    /// If the path is `None`, an in-memory database is created.
    pub fn open(path: Option<&str>) -> StoreResult<Self> {
        let display_path = path.unwrap_or(":memory:");
        let open_err = |source| StoreError::Open {
            path: display_path.to_string(),
            source,
        };

        let conn = match path {
            Some(p) => Connection::open(p).map_err(open_err)?,
            None => Connection::open_in_memory().map_err(open_err)?,
        };

        // a file that is not a database is first detected by the journal mode query
        let db = DatabaseConn { conn };
        db.configure().map_err(open_err)?;
        Ok(db)
    }

    /// Open an existing database without write access
    ///
    /// No pragmas are applied, so the journal mode and file set stay as they
    /// are. Used for inspection only.
    pub fn open_read_only(path: &str) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_string(),
            source,
        })?;
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
            .map_err(|source| StoreError::Open {
                path: path.to_string(),
                source,
            })?;
        Ok(DatabaseConn { conn })
    }

    /// Open a database at the specified path (convenience method)
    pub fn open_path(path: &str) -> StoreResult<Self> {
        Self::open(Some(path))
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(None)
    }

    fn configure(&self) -> rusqlite::Result<()> {
        // must precede the journal mode switch, which needs an exclusive lock
        self.conn
            .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;

        // In-memory databases report "memory" here instead of "wal"
        let _: String = self
            .conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        self.conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA temp_store=MEMORY;",
        )?;

        Ok(())
    }

    /// Schema version stamped in the database header (`PRAGMA user_version`)
    ///
    /// A never-initialized database reports 0.
    pub fn user_version(&self) -> StoreResult<u32> {
        let version: u32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    /// Overwrite the stored schema version
    pub fn set_user_version(&self, version: u32) -> StoreResult<()> {
        self.conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    /// Begin a transaction that takes the write lock immediately
    ///
    /// Other connections to the same file block (up to the busy timeout)
    /// until it ends, so a version read inside it cannot go stale before the
    /// matching create or upgrade commits.
    pub fn immediate_transaction(&mut self) -> StoreResult<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> StoreResult<bool> {
        table_exists(&self.conn, table_name)
    }

    /// Get the row count for a table
    pub fn table_count(&self, table_name: &str) -> StoreResult<u64> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: u64 = self.conn.query_row(&query, [], |row| row.get(0))?;
        Ok(count)
    }

    /// Column names of a table in declaration order
    pub fn table_columns(&self, table_name: &str) -> StoreResult<Vec<String>> {
        table_columns(&self.conn, table_name)
    }
}

pub(crate) fn table_exists(conn: &Connection, table_name: &str) -> StoreResult<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [table_name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub(crate) fn table_columns(conn: &Connection, table_name: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table_name], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = DatabaseConn::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_fresh_user_version_is_zero() {
        let db = DatabaseConn::open_in_memory().unwrap();
        assert_eq!(db.user_version().unwrap(), 0);

        db.set_user_version(48).unwrap();
        assert_eq!(db.user_version().unwrap(), 48);
    }

    #[test]
    fn test_table_exists() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn
            .execute("CREATE TABLE test_table (id INTEGER PRIMARY KEY)", [])
            .unwrap();

        assert!(db.table_exists("test_table").unwrap());
        assert!(!db.table_exists("nonexistent_table").unwrap());
    }

    #[test]
    fn test_table_count_and_columns() {
        let db = DatabaseConn::open_in_memory().unwrap();
        db.conn
            .execute_batch(
                "CREATE TABLE test_table (id INTEGER PRIMARY KEY, name TEXT);
                 INSERT INTO test_table (id) VALUES (1), (2), (3);",
            )
            .unwrap();

        assert_eq!(db.table_count("test_table").unwrap(), 3);
        assert_eq!(db.table_columns("test_table").unwrap(), vec!["id", "name"]);
        assert!(db.table_columns("missing").unwrap().is_empty());
    }

    #[test]
    fn test_open_bad_path() {
        let result = DatabaseConn::open_path("/nonexistent-dir/for/sure/store.sqlite3");
        assert!(matches!(result, Err(StoreError::Open { .. })));
    }

    #[test]
    fn test_open_non_database_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("garbage.sqlite3");
        std::fs::write(&path, vec![0x42u8; 4096]).unwrap();
        let path = path.to_string_lossy().to_string();

        match DatabaseConn::open_path(&path) {
            Err(StoreError::Open { path: p, .. }) => assert_eq!(p, path),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("garbage file opened as a database"),
        }
    }

    #[test]
    fn test_read_only_keeps_journal_mode() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("store.sqlite3");
        let path = path.to_string_lossy().to_string();
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE t (id INTEGER); PRAGMA user_version = 3;")
                .unwrap();
        }

        let db = DatabaseConn::open_read_only(&path).unwrap();
        assert_eq!(db.user_version().unwrap(), 3);
        assert!(db.table_exists("t").unwrap());
        assert!(db.conn.execute("INSERT INTO t (id) VALUES (1)", []).is_err());

        let mode: String = db
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
        assert!(!temp_dir.path().join("store.sqlite3-wal").exists());
    }

    #[test]
    fn test_read_only_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("absent.sqlite3");
        let result = DatabaseConn::open_read_only(&path.to_string_lossy());
        assert!(matches!(result, Err(StoreError::Open { .. })));
        assert!(!path.exists());
    }
}
