//! Process-wide store handle
//!
//! `StoreHandle` owns the single live connection to the Twimight store. It is
//! cheap to construct; the database file is only touched on the first call
//! that needs a connection, at which point the version state machine runs:
//!
//! ```text
//! stored == 0         -> on_create, stamp expected version
//! stored <  expected  -> Migrator::upgrade, stamp expected version
//! stored == expected  -> nothing
//! stored >  expected  -> Migrator::downgrade (refused by default)
//! ```

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::database::core::{
    DatabaseConn, DestructiveMigrator, Migrator, SchemaManager, StoreError, StoreResult,
};

/// Shared handle to the Twimight store
///
/// Obtain it through [`StoreHandle::get_instance`] (or [`AppContext::store`])
/// so that every collaborator in the process talks to the same connection.
pub struct StoreHandle {
    path: Option<String>,
    version: u32,
    migrator: Arc<dyn Migrator>,
    db: Mutex<Option<DatabaseConn>>,
}

impl StoreHandle {
    /// Create a handle for the store at `path` (in-memory when `None`)
    ///
    /// Nothing is opened until the first connection is requested.
    pub fn new(path: Option<String>, version: u32) -> Self {
        Self {
            path,
            version,
            migrator: Arc::new(DestructiveMigrator::default()),
            db: Mutex::new(None),
        }
    }

    /// Replace the migration policy used when the stored version differs
    pub fn with_migrator(mut self, migrator: Arc<dyn Migrator>) -> Self {
        self.migrator = migrator;
        self
    }

    /// Return the process-wide handle held by `ctx`, constructing it on first use
    pub fn get_instance(ctx: &AppContext) -> Arc<StoreHandle> {
        ctx.store()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Schema version this handle expects
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the underlying connection has been opened yet
    pub fn is_open(&self) -> StoreResult<bool> {
        let guard = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(guard.is_some())
    }

    /// Open the store now, running create or upgrade if needed
    pub fn open(&self) -> StoreResult<()> {
        self.with_connection(|_| Ok(()))
    }

    /// Run `f` against the live connection, opening the store first if needed
    ///
    /// Calls are serialized on the handle's connection lock.
    pub fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let mut guard = self.db.lock().map_err(|_| StoreError::LockPoisoned)?;
        let db = match guard.take() {
            Some(db) => db,
            None => self.open_store()?,
        };
        let db = guard.insert(db);
        f(&db.conn)
    }

    /// Delete all rows from every table, keeping schema and version
    pub fn flush_all(&self) -> StoreResult<()> {
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            SchemaManager::new(&tx).flush_all()?;
            tx.commit()?;
            info!("Flushed all tables");
            Ok(())
        })
    }

    /// Drop and recreate every table, then re-stamp the expected version
    pub fn reset(&self) -> StoreResult<()> {
        let version = self.version;
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            SchemaManager::new(&tx).recreate()?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
            Ok(())
        })
    }

    fn open_store(&self) -> StoreResult<DatabaseConn> {
        if self.version < 1 {
            return Err(StoreError::InvalidVersion(self.version));
        }

        let mut db = DatabaseConn::open(self.path.as_deref())?;
        if db.user_version()? == self.version {
            debug!("Database schema is current (v{})", self.version);
            return Ok(db);
        }

        {
            // another connection may have created or upgraded the store
            // since the read above, so decide again under the write lock
            let tx = db.immediate_transaction()?;
            let stored: u32 = tx.pragma_query_value(None, "user_version", |row| row.get(0))?;
            if stored == self.version {
                debug!("Database schema was brought to v{} by another connection", stored);
            } else {
                if stored == 0 {
                    info!("Initializing database schema v{}", self.version);
                    SchemaManager::new(&tx).on_create()?;
                } else if stored < self.version {
                    info!(
                        "Database needs migration from v{} to v{}",
                        stored, self.version
                    );
                    self.migrator.upgrade(&tx, stored, self.version)?;
                } else {
                    self.migrator.downgrade(&tx, stored, self.version)?;
                }
                tx.pragma_update(None, "user_version", self.version)?;
            }
            tx.commit()?;
        }

        Ok(db)
    }
}
