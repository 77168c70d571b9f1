//! Database module
//!
//! This module provides the local store used by the Twimight client to cache
//! tweets, users, direct messages, fetched web pages, peer discovery data and
//! revocation entries.
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   ├── schema      # Table descriptors, SchemaManager
//! │   ├── migration   # Migrator trait, destructive policy
//! │   └── error       # StoreError
//! │
//! ├── tables          # Table and column name constants
//! └── store           # StoreHandle: lazy open + version state machine
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use twimight_store::{AppContext, StoreConfig, StoreHandle};
//! use twimight_store::database::tables::tweets;
//!
//! let ctx = AppContext::new(StoreConfig::new(&None)?);
//! let store = StoreHandle::get_instance(&ctx);
//!
//! let cached: i64 = store.with_connection(|conn| {
//!     let sql = format!("SELECT COUNT(*) FROM {}", tweets::TABLE);
//!     Ok(conn.query_row(&sql, [], |row| row.get(0))?)
//! })?;
//!
//! // logout: drop cached rows, keep the schema
//! store.flush_all()?;
//! ```

pub mod core;
pub mod tables;

mod store;

pub use core::{
    ColumnDef, ColumnType, DatabaseConn, DestructiveMigrator, DowngradePolicy, Migrator,
    SchemaDefinitions, SchemaManager, SchemaStatus, StoreError, StoreResult, TableDef,
    DATABASE_NAME, ID_COLUMN, SCHEMA_VERSION,
};
pub use store::StoreHandle;

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
