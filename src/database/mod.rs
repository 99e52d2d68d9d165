//! Database module
//!
//! This module provides all database functionality for librarylook, organized into:
//!
//! - **core**: Connection handling, pooling, the data access layer and schema management
//! - **library**: The catalog database and its typed repositories
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # Connector trait and SQLite connector
//! │   ├── pool         # Connection pool and pooled guards
//! │   ├── provider     # Lazy pool lifecycle, connection-refused retry
//! │   ├── dal          # query / execute with logging and retry
//! │   ├── error        # Error classification
//! │   └── schema       # Table definitions, creation order, status
//! │
//! └── library/         # Catalog storage
//!     ├── publishers
//!     ├── books
//!     ├── members      # Members and membership types
//!     ├── staff
//!     └── circulation  # Borrowings, fines, reservations
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use librarylook::database::{LibraryDatabase, NewPublisher};
//!
//! let db = LibraryDatabase::open(settings, PoolOptions::default()).await?;
//! let id = db.publishers().insert(&NewPublisher {
//!     name: "Penguin Books".to_string(),
//!     ..Default::default()
//! }).await?;
//!
//! // Ad-hoc statements go through the DAL with positional parameters
//! let sql = "SELECT * FROM Publishers WHERE PublisherID = ?1";
//! let rows = db.dal().query(sql, &sql_params![id]).await?;
//!
//! db.shutdown().await;
//! ```

pub mod core;
pub mod library;

// Parameter values accepted by the DAL
pub use rusqlite::types::Value;

// Connection handling and the data access layer
pub use core::{
    classify, creation_order, ConnectionPool, ConnectionProvider, ConnectionSettings, Connector,
    Dal, DbErrorKind, ExecuteSummary, PoolOptions, PooledConnection, ProviderState, Row,
    SchemaDefinitions, SchemaManager, SchemaStatus, SqliteConnector, SqliteTarget, Table,
    DEFAULT_POOL_SIZE, DEFAULT_RETRY_BACKOFF,
};

// Catalog database (main entry point)
pub use library::LibraryDatabase;

// Catalog records and repositories
pub use library::{
    Book, BookRepository, Borrowing, BorrowingRepository, Fine, FineRepository, FromRow, Member,
    MemberRepository, MembershipType, MembershipTypeRepository, NewBook, NewBorrowing, NewFine,
    NewMember, NewMembershipType, NewPublisher, NewReservation, NewStaffMember, Publisher,
    PublisherRepository, Reservation, ReservationRepository, ReservationStatus, StaffMember,
    StaffRepository,
};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}
