#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! librarylook - A library catalog toolkit
//!
//! librarylook keeps a library's catalog (books, publishers, members, staff,
//! borrowings, fines and reservations) in an embedded SQLite database. It can be
//! used as both a command-line application and a library.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `database` | Connection pool, DAL, schema and repositories | `rusqlite`, `tokio` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `lens` | Catalog lens (browse, search, add, output formats) | All above |
//! | `cli` | The `librarylook` binary | All above + `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Just the data layer
//! librarylook = { version = "0.1", default-features = false, features = ["database"] }
//!
//! # Default (CLI binary)
//! librarylook = "0.1"
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: All database functionality (always available)
//!   - `core`: connector, pool, connection provider, DAL, schema management
//!   - `library`: `LibraryDatabase` and the per-table repositories
//! - **`lens`**: catalog browsing, search and record entry (requires `lens`)
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use librarylook::database::{LibraryDatabase, NewPublisher};
//! use librarylook::LibraryConfig;
//!
//! let config = LibraryConfig::new(&None)?;
//! let db = LibraryDatabase::open(config.connection_settings(), config.pool_options()).await?;
//!
//! let id = db.publishers().insert(&NewPublisher {
//!     name: "Penguin Books".to_string(),
//!     ..Default::default()
//! }).await?;
//!
//! for book in db.books().search("herbert").await? {
//!     println!("{} by {}", book.title, book.author);
//! }
//!
//! db.shutdown().await;
//! ```

pub mod config;
pub mod database;

// Lens module - feature gated
#[cfg(feature = "lens")]
pub mod lens;

// =============================================================================
// Configuration (always available)
// =============================================================================

pub use config::LibraryConfig;

pub use config::{format_size, get_database_info, DatabaseInfo, TableCount};

// =============================================================================
// Database Module - Re-export commonly used types (always available)
// =============================================================================

// Primary database type
pub use database::LibraryDatabase;

// Core database types
pub use database::{
    classify, ConnectionProvider, ConnectionSettings, Connector, Dal, DbErrorKind,
    ExecuteSummary, PoolOptions, Row, SchemaManager, SchemaStatus, SqliteConnector, Table,
};

// Catalog records
pub use database::{
    Book, Borrowing, Fine, Member, MembershipType, NewBook, NewBorrowing, NewFine, NewMember,
    NewMembershipType, NewPublisher, NewReservation, NewStaffMember, Publisher, Reservation,
    ReservationStatus, StaffMember,
};

// =============================================================================
// Lens Module - Feature-gated exports
// =============================================================================

#[cfg(feature = "lens")]
pub use lens::utils::OutputFormat;

#[cfg(feature = "lens")]
pub use lens::catalog::{CatalogKind, CatalogLens, CatalogTable};
