#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! twimight-store - local cache schema for the Twimight client
//!
//! This crate is the single authority on which tables exist in the client's
//! embedded SQLite store and what their columns are called. It creates the
//! store on first use, recreates it whenever the schema version changes, and
//! can empty every table on demand.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | `twimight-store` binary | `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: schema descriptors, lifecycle and the shared handle
//!   - `core`: connection wrapper, `SchemaManager`, `Migrator`, `StoreError`
//!   - `tables`: table and column name constants for data-access code
//!   - `StoreHandle`: lazily opened, process-wide connection owner
//! - **[`context`]**: `AppContext`, which hands out the one `StoreHandle`
//! - **[`config`]**: configuration loading and store status reporting
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use twimight_store::{AppContext, StoreConfig, StoreHandle};
//!
//! let ctx = AppContext::new(StoreConfig::new(&None)?);
//!
//! // First call opens ~/.twimight/twimight.sqlite3, creating or upgrading it
//! let store = StoreHandle::get_instance(&ctx);
//! store.open()?;
//!
//! // Reset cached data without touching the schema
//! store.flush_all()?;
//! ```

pub mod config;
pub mod context;
pub mod database;
pub mod output;

pub use config::{format_size, get_store_info, StoreConfig, StoreInfo, TableInfo};
pub use context::AppContext;
pub use output::OutputFormat;

pub use database::{
    DatabaseConn, DestructiveMigrator, DowngradePolicy, Migrator, SchemaDefinitions,
    SchemaManager, SchemaStatus, StoreError, StoreHandle, StoreResult, DATABASE_NAME,
    SCHEMA_VERSION,
};
