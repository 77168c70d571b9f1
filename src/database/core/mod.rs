//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DatabaseConn`: Core SQLite connection wrapper with configuration
//! - `SchemaManager`: Table creation, destructive upgrade, flush and reset
//! - `SchemaDefinitions`: Table descriptors in creation order
//! - `Migrator`: Pluggable version migration policy
//! - `StoreError`: Error taxonomy for all of the above

mod connection;
mod error;
mod migration;
mod schema;

pub use connection::DatabaseConn;
pub use error::{StoreError, StoreResult};
pub use migration::{DestructiveMigrator, DowngradePolicy, Migrator};
pub use schema::{
    ColumnDef, ColumnType, SchemaDefinitions, SchemaManager, SchemaStatus, TableDef,
    DATABASE_NAME, ID_COLUMN, SCHEMA_VERSION,
};
