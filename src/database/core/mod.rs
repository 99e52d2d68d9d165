//! Core database infrastructure
//!
//! This module provides the foundational database components used throughout librarylook:
//! - `Connector` / `SqliteConnector`: opening configured engine connections
//! - `ConnectionPool`: reusable connections handed out as guards
//! - `ConnectionProvider`: lazy pool lifecycle with connection-refused retry
//! - `Dal`: the `query` / `execute` entry point with logging and retry
//! - `SchemaManager`: schema creation in foreign-key dependency order

mod connection;
mod dal;
mod error;
mod pool;
mod provider;
mod row;
mod schema;

pub use connection::{ConnectionSettings, Connector, SqliteConnector, SqliteTarget};
pub use dal::Dal;
pub use error::{classify, DbErrorKind};
pub use pool::{ConnectionPool, PooledConnection, DEFAULT_POOL_SIZE};
pub use provider::{ConnectionProvider, PoolOptions, ProviderState, DEFAULT_RETRY_BACKOFF};
pub use row::{ExecuteSummary, Row};
pub use schema::{creation_order, SchemaDefinitions, SchemaManager, SchemaStatus, Table};
