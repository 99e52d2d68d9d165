//! Database connection management
//!
//! This module provides the seam between the connection pool and the storage
//! engine. A [`Connector`] knows how to open one configured connection; the pool
//! decides when to call it.

use anyhow::{anyhow, Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::time::Duration;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Hosts accepted for the embedded engine
const LOCAL_HOSTS: &[&str] = &["", "localhost", "127.0.0.1", "::1"];

/// Opens configured connections to the storage engine
///
/// Implementations are called from blocking threads, so `connect` may do file
/// I/O freely.
pub trait Connector: Send + Sync {
    /// Open and configure a new connection
    fn connect(&self) -> Result<Connection>;

    /// Human-readable description of the target, used in log lines
    fn describe(&self) -> String;

    /// Upper bound on simultaneously open connections for this target
    fn max_connections(&self) -> Option<usize> {
        None
    }
}

/// Where the SQLite database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteTarget {
    /// A database file on disk
    File(PathBuf),
    /// A private in-memory database
    Memory,
}

/// Connection parameters consumed by [`SqliteConnector`]
///
/// `user` and `password` only appear in the connection descriptor; the
/// embedded engine has no authentication.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub target: SqliteTarget,
}

impl ConnectionSettings {
    /// Settings for an in-memory database with default credentials
    pub fn in_memory() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            database: "librarylook".to_string(),
            target: SqliteTarget::Memory,
        }
    }

    /// `user@host/database`, never including the password
    pub fn descriptor(&self) -> String {
        let host = if self.host.is_empty() {
            "localhost"
        } else {
            self.host.as_str()
        };
        format!("{}@{}/{}", self.user, host, self.database)
    }
}

/// Production connector for SQLite targets
pub struct SqliteConnector {
    settings: ConnectionSettings,
}

impl SqliteConnector {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Configure the connection with the settings every pooled handle needs
    fn configure(conn: &Connection, target: &SqliteTarget) -> Result<()> {
        // Referential actions (CASCADE / SET NULL) depend on this
        conn.execute("PRAGMA foreign_keys=ON", [])
            .context("Failed to enable foreign keys")?;

        if matches!(target, SqliteTarget::File(_)) {
            let _: String = conn
                .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
                .context("Failed to set journal mode")?;

            conn.execute("PRAGMA synchronous=NORMAL", [])
                .context("Failed to set synchronous mode")?;
        }

        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        Ok(())
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> Result<Connection> {
        let host = self.settings.host.trim();
        if !LOCAL_HOSTS.contains(&host) {
            return Err(anyhow!(
                "Host '{}' is not reachable by the embedded engine; use localhost",
                host
            ));
        }

        let conn = match &self.settings.target {
            SqliteTarget::File(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open database at '{}'", path.display()))?,
            SqliteTarget::Memory => {
                Connection::open_in_memory().context("Failed to create in-memory database")?
            }
        };

        Self::configure(&conn, &self.settings.target)?;
        Ok(conn)
    }

    fn describe(&self) -> String {
        self.settings.descriptor()
    }

    fn max_connections(&self) -> Option<usize> {
        // each in-memory connection would be a separate database
        match self.settings.target {
            SqliteTarget::Memory => Some(1),
            SqliteTarget::File(_) => None,
        }
    }
}
