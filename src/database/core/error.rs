//! Error types for store lifecycle operations

use thiserror::Error;

/// Failures raised while opening, creating, upgrading or flushing the store.
///
/// None of these are recovered from internally. A caller receiving `Open`,
/// `Ddl` or `Downgrade` should treat the store as unusable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database at '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema statement failed on table '{table}': {source}")]
    Ddl {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to delete rows from table '{table}': {source}")]
    Dml {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database version {stored} is newer than supported version {expected}")]
    Downgrade { stored: u32, expected: u32 },

    #[error("invalid schema version {0}, must be at least 1")]
    InvalidVersion(u32),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
