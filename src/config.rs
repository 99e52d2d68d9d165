use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::database::{
    ConnectionProvider, ConnectionSettings, Dal, PoolOptions, SchemaManager, SchemaStatus,
    SqliteConnector, SqliteTarget, DEFAULT_POOL_SIZE, DEFAULT_RETRY_BACKOFF,
};

pub struct LibraryConfig {
    /// Path to the directory holding the catalog database
    pub data_dir: String,

    /// Database host; the embedded engine only accepts the local machine
    pub host: String,

    pub user: String,

    pub password: String,

    /// Database name, also the file stem of the SQLite file
    pub database: String,

    /// Maximum number of pooled connections (default: 5)
    pub pool_size: usize,

    /// Wait before retrying a refused connection, in seconds (default: 5)
    pub retry_backoff_secs: u64,
}

const EMPTY_CONFIG: &str = r#"### librarylook configuration file

### directory for the catalog database
# data_dir = "~/.librarylook"

### connection settings
# host = "localhost"
# user = "root"
# password = ""
# database = "librarylook"

### connection pool
# pool_size = 5
# retry_backoff_secs = 5
"#;

const ENV_PREFIX: &str = "LIBRARYLOOK";

fn default_data_dir() -> String {
    let home_dir = dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/.librarylook", home_dir)
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            database: "librarylook".to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            retry_backoff_secs: DEFAULT_RETRY_BACKOFF.as_secs(),
        }
    }
}

impl LibraryConfig {
    /// Function to create and initialize a new configuration
    ///
    /// Reads the TOML file at `path` (or `$HOME/.librarylook/librarylook.toml`),
    /// writing a commented template first if it does not exist, then applies
    /// `LIBRARYLOOK_*` environment variables on top.
    pub fn new(path: &Option<String>) -> Result<LibraryConfig> {
        let config_file = match path {
            Some(p) => p.clone(),
            None => {
                let dir = default_data_dir();
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create librarylook directory: {}", e))?;
                Self::config_file_path()
            }
        };

        let file = if Path::new(config_file.as_str()).exists() {
            Some(config_file.as_str())
        } else {
            std::fs::write(config_file.as_str(), EMPTY_CONFIG).map_err(|e| {
                anyhow!("Unable to create config file {}: {}", config_file.as_str(), e)
            })?;
            None
        };

        // E.g., `LIBRARYLOOK_DATA_DIR=/tmp/lib ./librarylook` would set the data directory
        Self::load(file, config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Build a configuration from an optional TOML file and an environment source
    pub fn load(file: Option<&str>, env: config::Environment) -> Result<LibraryConfig> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(env);

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let defaults = LibraryConfig::default();
        let text = |key: &str, default: String| config.get(key).cloned().unwrap_or(default);

        let pool_size = match config.get("pool_size") {
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("pool_size must be a positive integer, got '{}'", s))?,
            None => defaults.pool_size,
        };

        let retry_backoff_secs = match config.get("retry_backoff_secs") {
            Some(s) => s
                .parse::<u64>()
                .map_err(|_| anyhow!("retry_backoff_secs must be a whole number, got '{}'", s))?,
            None => defaults.retry_backoff_secs,
        };

        Ok(LibraryConfig {
            data_dir: text("data_dir", defaults.data_dir),
            host: text("host", defaults.host),
            user: text("user", defaults.user),
            password: text("password", defaults.password),
            database: text("database", defaults.database),
            pool_size,
            retry_backoff_secs,
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}.sqlite3", data_dir, self.database)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }

    /// Connection settings for the configured database file
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            target: SqliteTarget::File(self.sqlite_path().into()),
        }
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.pool_size,
            retry_backoff: self.retry_backoff(),
        }
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let password = if self.password.is_empty() {
            "(empty)"
        } else {
            "********"
        };
        [
            format!("Data Directory:     {}", self.data_dir),
            format!("SQLite Path:        {}", self.sqlite_path()),
            format!("Host:               {}", self.host),
            format!("User:               {}", self.user),
            format!("Password:           {}", password),
            format!("Database:           {}", self.database),
            format!("Pool Size:          {}", self.pool_size),
            format!("Retry Backoff:      {} seconds", self.retry_backoff_secs),
        ]
        .join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        format!("{}/librarylook.toml", default_data_dir())
    }
}

/// Row count of one catalog table
#[derive(Debug, Serialize, Clone)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct TableCount {
    pub table: String,
    pub rows: u64,
}

/// Information about the catalog database
#[derive(Debug, Serialize, Clone)]
pub struct DatabaseInfo {
    pub path: String,
    pub descriptor: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaStatus>,
    pub tables: Vec<TableCount>,
}

/// Inspect the catalog database without creating anything
///
/// A missing database file is reported as such rather than created; an
/// existing one is opened to read the schema status and row counts.
pub async fn get_database_info(config: &LibraryConfig) -> DatabaseInfo {
    let settings = config.connection_settings();
    let path = config.sqlite_path();
    let exists = Path::new(&path).exists();
    let size_bytes = if exists {
        std::fs::metadata(&path).ok().map(|m| m.len())
    } else {
        None
    };

    let mut info = DatabaseInfo {
        path,
        descriptor: settings.descriptor(),
        exists,
        size_bytes,
        schema: None,
        tables: Vec::new(),
    };
    if !exists {
        return info;
    }

    let provider = Arc::new(ConnectionProvider::new(
        Arc::new(SqliteConnector::new(settings)),
        config.pool_options(),
    ));
    let dal = Dal::new(provider.clone());
    let manager = SchemaManager::new(&dal);

    info.schema = manager.check_status().await.ok();
    if let Ok(tables) = manager.existing_tables().await {
        for table in tables {
            if let Ok(rows) = manager.table_count(table).await {
                info.tables.push(TableCount {
                    table: table.name().to_string(),
                    rows,
                });
            }
        }
    }

    provider.shutdown().await;
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
