//! Connection pool
//!
//! A small pool of configured SQLite connections. Connections are opened lazily
//! up to `max_size`, handed out as [`PooledConnection`] guards, and returned to
//! the idle list when the guard drops.

use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::connection::Connector;

/// Default number of connections a pool may hold open
pub const DEFAULT_POOL_SIZE: usize = 5;

type IdleList = Arc<Mutex<Vec<Connection>>>;

/// Reusable set of open connections to one database
pub struct ConnectionPool {
    connector: Arc<dyn Connector>,
    idle: IdleList,
    permits: Arc<Semaphore>,
    max_size: usize,
}

impl ConnectionPool {
    /// Create a pool and verify the target is reachable
    ///
    /// One connection is opened immediately and parked in the idle list, so a
    /// pool that exists has connected at least once.
    pub async fn open(connector: Arc<dyn Connector>, max_size: usize) -> Result<Self> {
        let max_size = connector
            .max_connections()
            .map_or(max_size, |cap| max_size.min(cap))
            .max(1);

        let first = connect_blocking(connector.clone()).await?;

        Ok(Self {
            connector,
            idle: Arc::new(Mutex::new(vec![first])),
            permits: Arc::new(Semaphore::new(max_size)),
            max_size,
        })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of connections currently parked in the pool
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    pub fn describe(&self) -> String {
        self.connector.describe()
    }

    /// Check out a connection, waiting if all `max_size` are in use
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| anyhow!("Connection pool closed: {}", e))?;

        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let conn = match reused {
            Some(conn) => conn,
            None => {
                debug!("opening new pooled connection to {}", self.describe());
                connect_blocking(self.connector.clone()).await?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            idle: self.idle.clone(),
            _permit: permit,
        })
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("target", &self.describe())
            .field("max_size", &self.max_size)
            .field("idle", &self.idle_count())
            .finish()
    }
}

async fn connect_blocking(connector: Arc<dyn Connector>) -> Result<Connection> {
    tokio::task::spawn_blocking(move || connector.connect())
        .await
        .map_err(|e| anyhow!("Connection task failed: {}", e))?
}

/// A connection checked out of a [`ConnectionPool`]
///
/// Derefs to [`rusqlite::Connection`]; dropping it returns the connection to
/// the pool it came from.
pub struct PooledConnection {
    conn: Option<Connection>,
    idle: IdleList,
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // only taken in drop
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        match &mut self.conn {
            Some(conn) => conn,
            None => unreachable!("pooled connection used after release"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Ok(mut idle) = self.idle.lock() {
                idle.push(conn);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::connection::{ConnectionSettings, SqliteConnector, SqliteTarget};

    fn file_connector(dir: &tempfile::TempDir) -> Arc<dyn Connector> {
        Arc::new(SqliteConnector::new(ConnectionSettings {
            target: SqliteTarget::File(dir.path().join("pool.sqlite3")),
            ..ConnectionSettings::in_memory()
        }))
    }

    #[tokio::test]
    async fn test_open_parks_one_connection() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(file_connector(&dir), 3).await.unwrap();

        assert_eq!(pool.max_size(), 3);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_connections_return_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(file_connector(&dir), 3).await.unwrap();

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        assert_eq!(pool.idle_count(), 0);

        a.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", [])
            .unwrap();
        drop(a);
        drop(b);
        assert_eq!(pool.idle_count(), 2);

        // both connections see the same file
        let c = pool.acquire().await.unwrap();
        let count: i64 = c
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_in_memory_pool_is_capped() {
        let connector: Arc<dyn Connector> =
            Arc::new(SqliteConnector::new(ConnectionSettings::in_memory()));
        let pool = ConnectionPool::open(connector, 5).await.unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[tokio::test]
    async fn test_debug_shows_target_and_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(file_connector(&dir), 2).await.unwrap();

        let shown = format!("{:?}", pool);
        assert!(shown.contains("root@localhost/librarylook"));
        assert!(shown.contains("max_size: 2"));
        assert!(shown.contains("idle: 1"));
    }
}
