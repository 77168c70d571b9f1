//! Database schema management
//!
//! This module provides the table descriptors and the lifecycle operations
//! (create, destructive upgrade, flush, reset) for the Twimight store. The
//! concrete table layouts live in [`crate::database::tables`].

use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::connection::{table_columns, table_exists};
use super::error::{StoreError, StoreResult};
use crate::database::tables;

/// Current schema version
///
/// Any change to a table descriptor must bump this; stores at an older
/// version are dropped and recreated on open.
pub const SCHEMA_VERSION: u32 = 48;

/// Logical store name, used to derive the database file name
pub const DATABASE_NAME: &str = "twimight";

/// Name of the surrogate primary key column present on every table
pub const ID_COLUMN: &str = "_id";

/// Declared SQL type of a column
///
/// The declared spelling is preserved exactly as written here since it is
/// part of the on-disk contract shared with existing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Text,
    Int,
    Integer,
    BigInt,
    Real,
}

impl ColumnType {
    pub const fn sql(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Real => "real",
        }
    }
}

/// A single column in a table descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<i64>,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            not_null: false,
            unique: false,
            default: None,
        }
    }

    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Column starts at zero, as flags and counters do
    pub const fn default_zero(mut self) -> Self {
        self.default = Some(0);
        self
    }

    fn sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.ty.sql());
        if self.not_null {
            sql.push_str(" not null");
        }
        if self.unique {
            sql.push_str(" unique");
        }
        if let Some(default) = self.default {
            sql.push_str(&format!(" default {}", default));
        }
        sql
    }
}

/// A table descriptor: name plus the columns that follow the surrogate key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    /// `CREATE TABLE` statement for this table
    pub fn create_sql(&self) -> String {
        let mut parts = Vec::with_capacity(self.columns.len() + 1);
        parts.push(format!(
            "{} integer primary key autoincrement not null",
            ID_COLUMN
        ));
        parts.extend(self.columns.iter().map(ColumnDef::sql));
        format!("create table {} ({});", self.name, parts.join(", "))
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {}", self.name)
    }

    /// All column names including the surrogate key, in declaration order
    pub fn column_names(&self) -> Vec<&'static str> {
        std::iter::once(ID_COLUMN)
            .chain(self.columns.iter().map(|c| c.name))
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Schema definitions for all tables in the store
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Every table, in creation order
    pub const TABLES: &'static [TableDef] = &[
        tables::macs::DEFINITION,
        tables::locations::DEFINITION,
        tables::revocations::DEFINITION,
        tables::friends_keys::DEFINITION,
        tables::tweets::DEFINITION,
        tables::users::DEFINITION,
        tables::dms::DEFINITION,
        tables::htmls::DEFINITION,
    ];

    /// Look up a table descriptor by name
    pub fn table(name: &str) -> Option<&'static TableDef> {
        Self::TABLES.iter().find(|t| t.name == name)
    }

    pub fn table_names() -> Vec<&'static str> {
        Self::TABLES.iter().map(|t| t.name).collect()
    }
}

/// Schema manager for the store
///
/// Operates on one borrowed connection (or transaction). It does not track
/// versions itself; the caller decides when to create, upgrade or flush.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create every table
    ///
    /// Called once, the first time a store is opened. Fails on the first
    /// statement that does not succeed.
    pub fn on_create(&self) -> StoreResult<()> {
        info!("Creating {} tables", SchemaDefinitions::TABLES.len());
        self.create_tables()
    }

    /// Replace the schema of a store at an older version
    ///
    /// Drops every table and recreates it empty. The versions only feed the
    /// log line; the action is the same for any pair.
    pub fn on_upgrade(&self, old_version: u32, new_version: u32) -> StoreResult<()> {
        warn!(
            "Upgrading database from version {} to {}, which will destroy all old data",
            old_version, new_version
        );
        self.drop_tables()?;
        self.create_tables()
    }

    /// Drop and recreate every table regardless of the stored version
    pub fn recreate(&self) -> StoreResult<()> {
        warn!("Resetting database schema, all cached data will be lost");
        self.drop_tables()?;
        self.create_tables()
    }

    /// Delete all rows from every table, keeping the schema
    pub fn flush_all(&self) -> StoreResult<()> {
        for table in SchemaDefinitions::TABLES {
            let deleted = self
                .conn
                .execute(&table.delete_sql(), [])
                .map_err(|source| StoreError::Dml {
                    table: table.name,
                    source,
                })?;
            debug!("Flushed {} rows from {}", deleted, table.name);
        }
        Ok(())
    }

    fn create_tables(&self) -> StoreResult<()> {
        for table in SchemaDefinitions::TABLES {
            self.conn
                .execute(&table.create_sql(), [])
                .map_err(|source| StoreError::Ddl {
                    table: table.name,
                    source,
                })?;
        }
        Ok(())
    }

    fn drop_tables(&self) -> StoreResult<()> {
        for table in SchemaDefinitions::TABLES {
            self.conn
                .execute(&table.drop_sql(), [])
                .map_err(|source| StoreError::Ddl {
                    table: table.name,
                    source,
                })?;
        }
        Ok(())
    }

    /// Check the current schema status against an expected version
    pub fn check_status(&self, expected: u32) -> StoreResult<SchemaStatus> {
        let current: u32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if current == 0 {
            return Ok(SchemaStatus::NotInitialized);
        }

        if current == expected {
            if self.verify_integrity()? {
                Ok(SchemaStatus::Current)
            } else {
                Ok(SchemaStatus::Corrupted)
            }
        } else if current < expected {
            Ok(SchemaStatus::NeedsMigration {
                from: current,
                to: expected,
            })
        } else {
            Ok(SchemaStatus::Incompatible {
                database_version: current,
                required_version: expected,
            })
        }
    }

    /// Verify every table exists with exactly its declared columns
    pub fn verify_integrity(&self) -> StoreResult<bool> {
        for table in SchemaDefinitions::TABLES {
            if !table_exists(self.conn, table.name)? {
                debug!("Table {} is missing", table.name);
                return Ok(false);
            }
            let actual = table_columns(self.conn, table.name)?;
            if actual != table.column_names() {
                debug!("Table {} has unexpected columns: {:?}", table.name, actual);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database is not initialized (fresh database)
    NotInitialized,

    /// Schema is current and valid
    Current,

    /// Schema is at an older version and will be recreated on open
    NeedsMigration { from: u32, to: u32 },

    /// Database is from a newer version
    Incompatible {
        database_version: u32,
        required_version: u32,
    },

    /// Version matches but tables are missing or differ from their descriptors
    Corrupted,
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::NotInitialized => write!(f, "not initialized"),
            SchemaStatus::Current => write!(f, "current"),
            SchemaStatus::NeedsMigration { from, to } => {
                write!(f, "needs upgrade (v{} -> v{})", from, to)
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => write!(
                f,
                "incompatible (db: v{}, required: v{})",
                database_version, required_version
            ),
            SchemaStatus::Corrupted => write!(f, "corrupted"),
        }
    }
}
