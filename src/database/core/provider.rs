//! Connection provider
//!
//! Owns the lazily created connection pool for one database. The pool is built
//! on first use and reused afterwards; a connection-refused failure while
//! building it is retried once after a fixed backoff.
//!
//! ```text
//! Uninitialized --pool()--> Connecting --ok--> Ready
//!                               ^                |
//!                               +--reconnect()---+
//! ```

use anyhow::Result;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::connection::Connector;
use super::error::{classify, DbErrorKind};
use super::pool::{ConnectionPool, PooledConnection, DEFAULT_POOL_SIZE};

/// Default wait before the single pool-creation retry
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Pool sizing and retry settings
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_size: usize,
    pub retry_backoff: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_POOL_SIZE,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

/// Lifecycle of the provider's pool handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Uninitialized,
    Connecting,
    Ready,
}

impl ProviderState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Connecting => 1,
            Self::Ready => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Connecting,
            2 => Self::Ready,
            _ => Self::Uninitialized,
        }
    }
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Connecting => write!(f, "connecting"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Supplies pooled connections to the DAL
///
/// Constructed once by the composition point and shared by `Arc`. The pool slot
/// is guarded by an async mutex, so concurrent first callers wait for the same
/// pool rather than building duplicates.
pub struct ConnectionProvider {
    connector: Arc<dyn Connector>,
    options: PoolOptions,
    pool: Mutex<Option<Arc<ConnectionPool>>>,
    state: AtomicU8,
}

impl ConnectionProvider {
    pub fn new(connector: Arc<dyn Connector>, options: PoolOptions) -> Self {
        Self {
            connector,
            options,
            pool: Mutex::new(None),
            state: AtomicU8::new(ProviderState::Uninitialized.as_u8()),
        }
    }

    pub fn state(&self) -> ProviderState {
        ProviderState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn options(&self) -> &PoolOptions {
        &self.options
    }

    pub fn describe(&self) -> String {
        self.connector.describe()
    }

    fn set_state(&self, state: ProviderState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    /// Get the pool, creating it on first use
    pub async fn pool(&self) -> Result<Arc<ConnectionPool>> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = Arc::new(self.create_pool().await?);
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Check out a connection from the pool
    pub async fn get_connection(&self) -> Result<PooledConnection> {
        let pool = self.pool().await?;
        pool.acquire().await
    }

    /// Discard the current pool and build a fresh one
    ///
    /// Connections still checked out from the old pool stay valid until their
    /// guards drop; they are then closed instead of being reused.
    pub async fn reconnect(&self) -> Result<Arc<ConnectionPool>> {
        let mut slot = self.pool.lock().await;
        if slot.take().is_some() {
            info!("Re-establishing connection pool for {}", self.describe());
        }

        let pool = Arc::new(self.create_pool().await?);
        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Release the pool; the next `pool()` call will connect again
    pub async fn shutdown(&self) {
        let mut slot = self.pool.lock().await;
        if slot.take().is_some() {
            info!("Released connection pool for {}", self.describe());
        }
        self.set_state(ProviderState::Uninitialized);
    }

    async fn create_pool(&self) -> Result<ConnectionPool> {
        self.set_state(ProviderState::Connecting);

        let result = match self.try_open().await {
            Err(e) if classify(&e) == DbErrorKind::ConnectionRefused => {
                warn!(
                    "Retrying connection to {} in {} seconds...",
                    self.describe(),
                    self.options.retry_backoff.as_secs_f64()
                );
                tokio::time::sleep(self.options.retry_backoff).await;
                self.try_open().await
            }
            other => other,
        };

        match result {
            Ok(pool) => {
                info!("Connected to {}", self.describe());
                self.set_state(ProviderState::Ready);
                Ok(pool)
            }
            Err(e) => {
                self.set_state(ProviderState::Uninitialized);
                Err(e)
            }
        }
    }

    async fn try_open(&self) -> Result<ConnectionPool> {
        ConnectionPool::open(self.connector.clone(), self.options.max_size)
            .await
            .inspect_err(|e| {
                error!(
                    kind = %classify(e),
                    "Error connecting to {}: {:#}",
                    self.describe(),
                    e
                )
            })
    }
}
