use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::database::{
    DatabaseConn, DowngradePolicy, SchemaDefinitions, SchemaManager, SchemaStatus, DATABASE_NAME,
    SCHEMA_VERSION,
};

pub struct StoreConfig {
    /// Path to the directory holding the store file
    pub data_dir: String,

    /// What to do when the store was written by a newer schema version
    pub downgrade_policy: DowngradePolicy,
}

const EMPTY_CONFIG: &str = r#"### twimight-store configuration file

### directory holding the local store (the file is <data_dir>/twimight.sqlite3)
# data_dir = "~/.twimight"

### drop and recreate all tables when the store is newer than this build
# recreate_on_downgrade = false
"#;

impl Default for StoreConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.twimight", home_dir),
            downgrade_policy: DowngradePolicy::Refuse,
        }
    }
}

impl StoreConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<StoreConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.twimight/twimight.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let twimight_dir = format!("{}/.twimight", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(twimight_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create twimight directory: {}", e))?;
                let p = format!("{}/twimight.toml", twimight_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // E.g., `TWIMIGHT_DATA_DIR=/tmp/tw twimight-store status` overrides the data directory
        builder = builder.add_source(config::Environment::with_prefix("TWIMIGHT"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p, &home_dir),
            None => twimight_dir,
        };

        let downgrade_policy = match config.get("recreate_on_downgrade") {
            Some(v) => match v.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => DowngradePolicy::Recreate,
                "false" | "0" | "no" | "" => DowngradePolicy::Refuse,
                other => {
                    return Err(anyhow!(
                        "Invalid value for recreate_on_downgrade: '{}'",
                        other
                    ))
                }
            },
            None => DowngradePolicy::Refuse,
        };

        Ok(StoreConfig {
            data_dir,
            downgrade_policy,
        })
    }

    /// Configuration rooted at a specific data directory, all else default
    pub fn with_data_dir(data_dir: &str) -> Self {
        Self {
            data_dir: data_dir.to_string(),
            ..Default::default()
        }
    }

    /// Get the path to the SQLite database file
    ///
    /// Only the directory is configurable; the file name is fixed by [`DATABASE_NAME`].
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}.sqlite3", data_dir, DATABASE_NAME)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let downgrade = match self.downgrade_policy {
            DowngradePolicy::Refuse => "refuse",
            DowngradePolicy::Recreate => "recreate",
        };
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Schema Version:     {}", SCHEMA_VERSION),
            format!("On Downgrade:       {}", downgrade),
        ]
        .join("\n")
    }
}

fn expand_home(path: &str, home_dir: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) => format!("{}{}", home_dir, rest),
        None => path.to_string(),
    }
}

// =============================================================================
// Store Info Types (used by the status command)
// =============================================================================

/// Information about the on-disk store
#[derive(Debug, Serialize, Clone)]
pub struct StoreInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    pub expected_version: u32,
    pub status: String,
    pub tables: Vec<TableInfo>,
}

/// Row and column counts for one table
#[derive(Debug, Serialize, Clone)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct TableInfo {
    pub name: String,
    pub present: bool,
    pub columns: usize,
    pub rows: u64,
}

/// Inspect the store described by `config` without creating or upgrading it
///
/// The file is opened read-only with no pragmas applied. Best effort:
/// anything that cannot be read is reported as absent.
pub fn get_store_info(config: &StoreConfig) -> StoreInfo {
    let sqlite_path = config.sqlite_path();
    let metadata = std::fs::metadata(&sqlite_path).ok();
    let exists = metadata.is_some();
    let size_bytes = metadata.as_ref().map(|m| m.len());
    let modified = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(|t| {
            chrono::DateTime::<chrono::Utc>::from(t)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        });

    let mut info = StoreInfo {
        path: sqlite_path.clone(),
        exists,
        size_bytes,
        modified,
        schema_version: None,
        expected_version: SCHEMA_VERSION,
        status: if exists {
            "unreadable".to_string()
        } else {
            SchemaStatus::NotInitialized.to_string()
        },
        tables: Vec::new(),
    };

    if !exists {
        return info;
    }

    let db = match DatabaseConn::open_read_only(&sqlite_path) {
        Ok(db) => db,
        Err(_) => return info,
    };

    info.schema_version = match db.user_version() {
        Ok(v) => Some(v),
        Err(_) => return info,
    };
    if let Ok(status) = SchemaManager::new(&db.conn).check_status(SCHEMA_VERSION) {
        info.status = status.to_string();
    }

    info.tables = SchemaDefinitions::TABLES
        .iter()
        .map(|table| {
            let present = db.table_exists(table.name).unwrap_or(false);
            let (columns, rows) = if present {
                (
                    db.table_columns(table.name).map(|c| c.len()).unwrap_or(0),
                    db.table_count(table.name).unwrap_or(0),
                )
            } else {
                (0, 0)
            };
            TableInfo {
                name: table.name.to_string(),
                present,
                columns,
                rows,
            }
        })
        .collect();

    info
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreHandle;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.sqlite_path().ends_with("/.twimight/twimight.sqlite3"));
        assert_eq!(config.downgrade_policy, DowngradePolicy::Refuse);
        assert!(config.data_dir.ends_with("/.twimight"));
    }

    #[test]
    fn test_paths() {
        let config = StoreConfig::with_data_dir("/test/dir/");
        assert_eq!(config.sqlite_path(), "/test/dir/twimight.sqlite3");
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("twimight.toml");
        std::fs::write(
            &config_path,
            "data_dir = \"/var/lib/twimight\"\n\
             recreate_on_downgrade = true\n",
        )
        .unwrap();

        let config =
            StoreConfig::new(&Some(config_path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.data_dir, "/var/lib/twimight");
        assert_eq!(config.downgrade_policy, DowngradePolicy::Recreate);
        assert_eq!(config.sqlite_path(), "/var/lib/twimight/twimight.sqlite3");
    }

    #[test]
    fn test_missing_file_is_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("new.toml");

        let config =
            StoreConfig::new(&Some(config_path.to_string_lossy().to_string())).unwrap();
        assert!(config_path.exists());
        assert_eq!(config.downgrade_policy, DowngradePolicy::Refuse);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("~/.tw", "/home/a"), "/home/a/.tw");
        assert_eq!(expand_home("/abs", "/home/a"), "/abs");
    }

    #[test]
    fn test_store_info_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_data_dir(temp_dir.path().to_str().unwrap());

        let info = get_store_info(&config);
        assert!(!info.exists);
        assert!(info.tables.is_empty());
        assert_eq!(info.status, "not initialized");
    }

    #[test]
    fn test_store_info_after_open() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_data_dir(temp_dir.path().to_str().unwrap());

        let store = StoreHandle::new(Some(config.sqlite_path()), SCHEMA_VERSION);
        store
            .with_connection(|conn| {
                conn.execute("INSERT INTO macs (mac) VALUES ('00:11:22:33:44:55')", [])?;
                Ok(())
            })
            .unwrap();

        let info = get_store_info(&config);
        assert!(info.exists);
        assert_eq!(info.schema_version, Some(SCHEMA_VERSION));
        assert_eq!(info.status, "current");
        assert_eq!(info.tables.len(), 8);

        let macs = &info.tables[0];
        assert_eq!(macs.name, "macs");
        assert_eq!(macs.columns, 6);
        assert_eq!(macs.rows, 1);
    }

    #[test]
    fn test_store_name_is_not_configurable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("twimight.toml");
        std::fs::write(&config_path, "data_dir = \"/srv/tw\"\ndatabase_name = \"other\"\n")
            .unwrap();

        let config =
            StoreConfig::new(&Some(config_path.to_string_lossy().to_string())).unwrap();
        assert_eq!(config.sqlite_path(), "/srv/tw/twimight.sqlite3");
    }

    #[test]
    fn test_store_info_does_not_modify_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_data_dir(temp_dir.path().to_str().unwrap());
        let path = config.sqlite_path();

        {
            let store = StoreHandle::new(Some(path.clone()), SCHEMA_VERSION);
            store.open().unwrap();
        }
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            let mode: String = conn
                .query_row("PRAGMA journal_mode=DELETE", [], |row| row.get(0))
                .unwrap();
            assert_eq!(mode, "delete");
        }
        assert!(!Path::new(&format!("{}-wal", path)).exists());

        let info = get_store_info(&config);
        assert_eq!(info.status, "current");
        assert_eq!(info.tables.len(), 8);

        assert!(!Path::new(&format!("{}-wal", path)).exists());
        assert!(!Path::new(&format!("{}-shm", path)).exists());
        let conn = rusqlite::Connection::open(&path).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "delete");
    }

    #[test]
    fn test_store_info_unreadable() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_data_dir(temp_dir.path().to_str().unwrap());
        std::fs::write(config.sqlite_path(), vec![0x42u8; 4096]).unwrap();

        let info = get_store_info(&config);
        assert!(info.exists);
        assert_eq!(info.status, "unreadable");
        assert!(info.schema_version.is_none());
        assert!(info.tables.is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }
}
