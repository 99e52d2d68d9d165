//! Database schema management
//!
//! This module declares the eight catalog tables and creates them in foreign-key
//! dependency order. Creation order is derived from each table's declared
//! references rather than from statement order, so adding or reordering tables
//! cannot break referential integrity.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::info;

use super::dal::Dal;

/// Tables of the catalog schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Table {
    Publishers,
    Books,
    MembershipTypes,
    Members,
    Staff,
    Borrowings,
    Fines,
    Reservations,
}

impl Table {
    /// Every table, in declaration order
    pub const ALL: [Table; 8] = [
        Table::Publishers,
        Table::Books,
        Table::MembershipTypes,
        Table::Members,
        Table::Staff,
        Table::Borrowings,
        Table::Fines,
        Table::Reservations,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Publishers => "Publishers",
            Table::Books => "Books",
            Table::MembershipTypes => "MembershipTypes",
            Table::Members => "Members",
            Table::Staff => "Staff",
            Table::Borrowings => "Borrowings",
            Table::Fines => "Fines",
            Table::Reservations => "Reservations",
        }
    }

    /// Tables this table's foreign keys point at
    pub fn references(&self) -> &'static [Table] {
        match self {
            Table::Publishers | Table::MembershipTypes | Table::Staff => &[],
            Table::Books => &[Table::Publishers],
            Table::Members => &[Table::MembershipTypes],
            Table::Borrowings => &[Table::Members, Table::Books, Table::Staff],
            Table::Fines => &[Table::Borrowings],
            Table::Reservations => &[Table::Members, Table::Books],
        }
    }

    /// Idempotent `CREATE TABLE IF NOT EXISTS` statement
    pub fn create_sql(&self) -> &'static str {
        match self {
            Table::Publishers => SchemaDefinitions::PUBLISHERS_TABLE,
            Table::Books => SchemaDefinitions::BOOKS_TABLE,
            Table::MembershipTypes => SchemaDefinitions::MEMBERSHIP_TYPES_TABLE,
            Table::Members => SchemaDefinitions::MEMBERS_TABLE,
            Table::Staff => SchemaDefinitions::STAFF_TABLE,
            Table::Borrowings => SchemaDefinitions::BORROWINGS_TABLE,
            Table::Fines => SchemaDefinitions::FINES_TABLE,
            Table::Reservations => SchemaDefinitions::RESERVATIONS_TABLE,
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Order `tables` so every table comes after the tables it references
///
/// Ties keep the order of the input. A reference to a table outside the set, or
/// a reference cycle, is an error.
pub fn creation_order(tables: &[Table]) -> Result<Vec<Table>> {
    for table in tables {
        if let Some(missing) = table.references().iter().find(|r| !tables.contains(r)) {
            return Err(anyhow!(
                "Table {} references {}, which is not part of the schema",
                table,
                missing
            ));
        }
    }

    let mut ordered: Vec<Table> = Vec::with_capacity(tables.len());
    let mut pending: Vec<Table> = tables.to_vec();

    while !pending.is_empty() {
        let ready = pending
            .iter()
            .position(|t| t.references().iter().all(|r| ordered.contains(r)))
            .ok_or_else(|| {
                let names: Vec<&str> = pending.iter().map(|t| t.name()).collect();
                anyhow!("Foreign-key cycle among tables: {}", names.join(", "))
            })?;
        ordered.push(pending.remove(ready));
    }

    Ok(ordered)
}

/// Schema definitions for all tables in the catalog database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    pub const PUBLISHERS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Publishers (
            PublisherID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(255) NOT NULL,
            Address TEXT,
            Email VARCHAR(100) UNIQUE,
            Phone VARCHAR(15) UNIQUE
        )
    "#;

    pub const BOOKS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Books (
            BookID INTEGER PRIMARY KEY AUTOINCREMENT,
            Title VARCHAR(255) NOT NULL,
            Author VARCHAR(255) NOT NULL,
            ISBN VARCHAR(20) UNIQUE NOT NULL,
            Genre VARCHAR(100),
            PublishedYear INT,
            PublisherID INT,
            Quantity INT NOT NULL CHECK (Quantity >= 0),
            FOREIGN KEY (PublisherID) REFERENCES Publishers(PublisherID) ON DELETE SET NULL
        )
    "#;

    pub const MEMBERSHIP_TYPES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS MembershipTypes (
            MembershipTypeID INTEGER PRIMARY KEY AUTOINCREMENT,
            TypeName VARCHAR(100) NOT NULL,
            DurationMonths INT NOT NULL,
            Fee DECIMAL(10,2) NOT NULL
        )
    "#;

    pub const MEMBERS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Members (
            MemberID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(255) NOT NULL,
            Email VARCHAR(100) UNIQUE NOT NULL,
            Phone VARCHAR(15) UNIQUE NOT NULL,
            Address TEXT,
            MembershipTypeID INT,
            MembershipDate DATE DEFAULT (DATE('now')),
            FOREIGN KEY (MembershipTypeID) REFERENCES MembershipTypes(MembershipTypeID)
                ON DELETE SET NULL
        )
    "#;

    pub const STAFF_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Staff (
            StaffID INTEGER PRIMARY KEY AUTOINCREMENT,
            Name VARCHAR(255) NOT NULL,
            Email VARCHAR(100) UNIQUE NOT NULL,
            Phone VARCHAR(15) UNIQUE NOT NULL,
            Role VARCHAR(50),
            HireDate DATE DEFAULT (DATE('now'))
        )
    "#;

    pub const BORROWINGS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Borrowings (
            BorrowID INTEGER PRIMARY KEY AUTOINCREMENT,
            MemberID INT,
            BookID INT,
            BorrowDate DATE DEFAULT (DATE('now')),
            DueDate DATE NOT NULL,
            ReturnDate DATE,
            StaffID INT,
            FOREIGN KEY (MemberID) REFERENCES Members(MemberID) ON DELETE CASCADE,
            FOREIGN KEY (BookID) REFERENCES Books(BookID) ON DELETE CASCADE,
            FOREIGN KEY (StaffID) REFERENCES Staff(StaffID) ON DELETE SET NULL
        )
    "#;

    pub const FINES_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Fines (
            FineID INTEGER PRIMARY KEY AUTOINCREMENT,
            BorrowID INT,
            Amount DECIMAL(10,2) NOT NULL,
            Paid BOOLEAN NOT NULL DEFAULT FALSE,
            FOREIGN KEY (BorrowID) REFERENCES Borrowings(BorrowID) ON DELETE CASCADE
        )
    "#;

    pub const RESERVATIONS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS Reservations (
            ReservationID INTEGER PRIMARY KEY AUTOINCREMENT,
            MemberID INT,
            BookID INT,
            ReservationDate DATE DEFAULT (DATE('now')),
            Status TEXT NOT NULL DEFAULT 'Pending'
                CHECK (Status IN ('Pending', 'Completed', 'Cancelled')),
            FOREIGN KEY (MemberID) REFERENCES Members(MemberID) ON DELETE CASCADE,
            FOREIGN KEY (BookID) REFERENCES Books(BookID) ON DELETE CASCADE
        )
    "#;
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SchemaStatus {
    /// None of the catalog tables exist (fresh database)
    NotInitialized,

    /// Some tables are missing, e.g. after a failed initialization
    Incomplete { missing: Vec<String> },

    /// Every table exists
    Current,
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::NotInitialized => write!(f, "not initialized"),
            SchemaStatus::Incomplete { missing } => {
                write!(f, "incomplete (missing: {})", missing.join(", "))
            }
            SchemaStatus::Current => write!(f, "current"),
        }
    }
}

/// Schema manager for the catalog database
///
/// All statements go through the DAL, so schema creation gets the same logging
/// and retry behavior as any other statement.
pub struct SchemaManager<'a> {
    dal: &'a Dal,
}

impl<'a> SchemaManager<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    /// Create every table that does not exist yet
    ///
    /// Safe to call repeatedly. On failure the error is returned as-is and
    /// tables created before the failing statement are kept.
    pub async fn initialize(&self) -> Result<()> {
        for table in creation_order(&Table::ALL)? {
            self.dal
                .execute(table.create_sql(), &[])
                .await
                .with_context(|| format!("Failed to create {} table", table))?;
        }
        info!("Catalog schema ready ({} tables)", Table::ALL.len());
        Ok(())
    }

    /// Names of the catalog tables present in the database
    pub async fn existing_tables(&self) -> Result<Vec<Table>> {
        let rows = self
            .dal
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                &[],
            )
            .await?;

        let mut found = Vec::new();
        for row in rows {
            let name: String = row.get("name")?;
            if let Some(table) = Table::from_name(&name) {
                found.push(table);
            }
        }
        Ok(found)
    }

    /// Check the current schema status
    pub async fn check_status(&self) -> Result<SchemaStatus> {
        let existing = self.existing_tables().await?;

        if existing.is_empty() {
            return Ok(SchemaStatus::NotInitialized);
        }

        let missing: Vec<String> = Table::ALL
            .iter()
            .filter(|t| !existing.contains(t))
            .map(|t| t.name().to_string())
            .collect();

        if missing.is_empty() {
            Ok(SchemaStatus::Current)
        } else {
            Ok(SchemaStatus::Incomplete { missing })
        }
    }

    /// Get the row count for a table
    pub async fn table_count(&self, table: Table) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count = self
            .dal
            .query_scalar(&sql, &[])
            .await
            .with_context(|| format!("Failed to count rows in {}", table))?;
        Ok(count.max(0) as u64)
    }

    /// Drop every catalog table, dependents first
    pub async fn reset(&self) -> Result<()> {
        let mut order = creation_order(&Table::ALL)?;
        order.reverse();

        for table in order {
            let sql = format!("DROP TABLE IF EXISTS {}", table.name());
            self.dal
                .execute(&sql, &[])
                .await
                .with_context(|| format!("Failed to drop {} table", table))?;
        }
        info!("Catalog schema dropped");
        Ok(())
    }
}
