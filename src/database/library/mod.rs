//! Library catalog database
//!
//! `LibraryDatabase` is the composition point: it owns the connection provider
//! (through the DAL), makes sure the schema exists, and hands out typed
//! repositories for each catalog table.

mod books;
mod circulation;
mod members;
mod publishers;
mod staff;

pub use books::{Book, BookRepository, NewBook};
pub use circulation::{
    Borrowing, BorrowingRepository, Fine, FineRepository, NewBorrowing, NewFine, NewReservation,
    Reservation, ReservationRepository, ReservationStatus,
};
pub use members::{
    Member, MemberRepository, MembershipType, MembershipTypeRepository, NewMember,
    NewMembershipType,
};
pub use publishers::{NewPublisher, Publisher, PublisherRepository};
pub use staff::{NewStaffMember, StaffMember, StaffRepository};

use crate::database::core::{
    ConnectionProvider, ConnectionSettings, Connector, Dal, PoolOptions, Row, SchemaManager,
    SchemaStatus, SqliteConnector, Table,
};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::types::Value;
use std::sync::Arc;
use tracing::info;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Main catalog database handle
///
/// Construct one per process and pass it by reference; call
/// [`LibraryDatabase::shutdown`] when done to release pooled connections.
pub struct LibraryDatabase {
    dal: Dal,
}

impl LibraryDatabase {
    /// Open the catalog database described by `settings`
    ///
    /// Missing tables are created on open.
    pub async fn open(settings: ConnectionSettings, options: PoolOptions) -> Result<Self> {
        Self::with_connector(Arc::new(SqliteConnector::new(settings)), options).await
    }

    /// Create an in-memory catalog database (for testing)
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(ConnectionSettings::in_memory(), PoolOptions::default()).await
    }

    /// Open the catalog database through an arbitrary connector
    pub async fn with_connector(
        connector: Arc<dyn Connector>,
        options: PoolOptions,
    ) -> Result<Self> {
        let provider = Arc::new(ConnectionProvider::new(connector, options));
        let db = Self {
            dal: Dal::new(provider),
        };

        let schema = db.schema();
        match schema.check_status().await? {
            SchemaStatus::Current => {
                info!("Catalog database schema is current");
            }
            SchemaStatus::NotInitialized => {
                info!("Initializing catalog database schema");
                schema.initialize().await?;
            }
            SchemaStatus::Incomplete { missing } => {
                info!(
                    "Catalog database missing tables ({}), creating them",
                    missing.join(", ")
                );
                schema.initialize().await?;
            }
        }

        Ok(db)
    }

    /// Get the data access layer (for ad-hoc statements)
    pub fn dal(&self) -> &Dal {
        &self.dal
    }

    pub fn provider(&self) -> &ConnectionProvider {
        self.dal.provider()
    }

    pub fn schema(&self) -> SchemaManager<'_> {
        SchemaManager::new(&self.dal)
    }

    pub fn publishers(&self) -> PublisherRepository<'_> {
        PublisherRepository::new(&self.dal)
    }

    pub fn books(&self) -> BookRepository<'_> {
        BookRepository::new(&self.dal)
    }

    pub fn membership_types(&self) -> MembershipTypeRepository<'_> {
        MembershipTypeRepository::new(&self.dal)
    }

    pub fn members(&self) -> MemberRepository<'_> {
        MemberRepository::new(&self.dal)
    }

    pub fn staff(&self) -> StaffRepository<'_> {
        StaffRepository::new(&self.dal)
    }

    pub fn borrowings(&self) -> BorrowingRepository<'_> {
        BorrowingRepository::new(&self.dal)
    }

    pub fn fines(&self) -> FineRepository<'_> {
        FineRepository::new(&self.dal)
    }

    pub fn reservations(&self) -> ReservationRepository<'_> {
        ReservationRepository::new(&self.dal)
    }

    /// Release the connection pool
    pub async fn shutdown(&self) {
        self.dal.provider().shutdown().await;
    }
}

/// Conversion from a DAL row into a typed record
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

pub(crate) async fn fetch_all<T: FromRow>(
    dal: &Dal,
    sql: &str,
    params: &[Value],
) -> Result<Vec<T>> {
    dal.query(sql, params).await?.iter().map(T::from_row).collect()
}

pub(crate) async fn fetch_optional<T: FromRow>(
    dal: &Dal,
    sql: &str,
    params: &[Value],
) -> Result<Option<T>> {
    dal.query(sql, params)
        .await?
        .first()
        .map(T::from_row)
        .transpose()
}

/// Run an INSERT and return the engine-assigned id
pub(crate) async fn insert_row(
    dal: &Dal,
    table: Table,
    sql: &str,
    params: &[Value],
) -> Result<i64> {
    let summary = dal.execute(sql, params).await?;
    summary
        .inserted_id
        .ok_or_else(|| anyhow!("Insert into {} did not return an id", table))
}

pub(crate) async fn count_rows(dal: &Dal, table: Table) -> Result<u64> {
    SchemaManager::new(dal).table_count(table).await
}

/// Read a `DATE` column stored as `YYYY-MM-DD` text
pub(crate) fn date_column(row: &Row, column: &str) -> Result<Option<NaiveDate>> {
    match row.get::<Option<String>>(column)? {
        Some(text) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(Some)
            .map_err(|e| anyhow!("Invalid date '{}' in column {}: {}", text, column, e)),
        None => Ok(None),
    }
}

pub(crate) fn date_value(date: Option<NaiveDate>) -> Value {
    match date {
        Some(date) => Value::Text(date.format(DATE_FORMAT).to_string()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{classify, DbErrorKind};
    use crate::sql_params;

    pub(super) fn penguin() -> NewPublisher {
        NewPublisher {
            name: "Penguin Books".to_string(),
            address: Some("New York, USA".to_string()),
            email: Some("contact@penguin.com".to_string()),
            phone: Some("1234567890".to_string()),
        }
    }

    pub(super) fn dune(publisher_id: Option<i64>) -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            genre: Some("Science Fiction".to_string()),
            published_year: Some(1965),
            publisher_id,
            quantity: 3,
        }
    }

    /// A `DATE('now')` default read back after an insert started on `before`
    pub(super) fn assert_default_date(stored: Option<NaiveDate>, before: NaiveDate) {
        let after = chrono::Utc::now().date_naive();
        let stored = stored.unwrap();
        assert!(
            stored == before || stored == after,
            "{} is neither {} nor {}",
            stored,
            before,
            after
        );
    }

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        assert_eq!(
            db.schema().check_status().await.unwrap(),
            SchemaStatus::Current
        );
        db.shutdown().await;
    }

    #[tokio::test]
    async fn test_reopen_file_database_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ConnectionSettings {
            target: crate::database::core::SqliteTarget::File(dir.path().join("lib.sqlite3")),
            ..ConnectionSettings::in_memory()
        };

        let db = LibraryDatabase::open(settings.clone(), PoolOptions::default())
            .await
            .unwrap();
        db.publishers().insert(&penguin()).await.unwrap();
        db.shutdown().await;

        let db = LibraryDatabase::open(settings, PoolOptions::default())
            .await
            .unwrap();
        assert_eq!(db.publishers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_penguin_scenario() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let p = penguin();

        let summary = db
            .dal()
            .execute(
                "INSERT INTO Publishers (Name, Address, Email, Phone) VALUES (?1, ?2, ?3, ?4)",
                &sql_params![p.name.clone(), p.address.clone(), p.email.clone(), p.phone.clone()],
            )
            .await
            .unwrap();
        assert_eq!(summary.rows_affected, 1);
        assert_eq!(summary.inserted_id, Some(1));

        let rows = db
            .dal()
            .query("SELECT * FROM Publishers", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<i64>("PublisherID").unwrap(), 1);
        assert_eq!(rows[0].get::<String>("Name").unwrap(), "Penguin Books");
        assert_eq!(rows[0].get::<String>("Address").unwrap(), "New York, USA");
        assert_eq!(rows[0].get::<String>("Email").unwrap(), "contact@penguin.com");
        assert_eq!(rows[0].get::<String>("Phone").unwrap(), "1234567890");
    }

    #[tokio::test]
    async fn test_insert_increments_count_and_id_is_readable() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let publisher_id = db.publishers().insert(&penguin()).await.unwrap();

        let before = db.books().count().await.unwrap();
        let book_id = db.books().insert(&dune(Some(publisher_id))).await.unwrap();
        assert_eq!(db.books().count().await.unwrap(), before + 1);

        let book = db.books().get(book_id).await.unwrap().unwrap();
        assert_eq!(book.id, book_id);
        assert_eq!(book.publisher_id, Some(publisher_id));
        assert_eq!(book.quantity, 3);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_rejected() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        db.books().insert(&dune(None)).await.unwrap();

        let err = db.books().insert(&dune(None)).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConstraintViolation);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();

        let mut book = dune(None);
        book.quantity = -1;
        let err = db.books().insert(&book).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConstraintViolation);
        assert_eq!(db.books().count().await.unwrap(), 0);

        book.quantity = 0;
        let id = db.books().insert(&book).await.unwrap();
        assert_eq!(db.books().get(id).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_deleting_publisher_nulls_book_reference() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let publisher_id = db.publishers().insert(&penguin()).await.unwrap();
        let book_id = db.books().insert(&dune(Some(publisher_id))).await.unwrap();

        db.dal()
            .execute(
                "DELETE FROM Publishers WHERE PublisherID = ?1",
                &sql_params![publisher_id],
            )
            .await
            .unwrap();

        let book = db.books().get(book_id).await.unwrap().unwrap();
        assert_eq!(book.publisher_id, None);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_member_cascades_borrowings() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let book_id = db.books().insert(&dune(None)).await.unwrap();
        let member_id = db
            .members()
            .insert(&NewMember {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "5550001".to_string(),
                address: None,
                membership_type_id: None,
                membership_date: None,
            })
            .await
            .unwrap();
        let borrow_id = db
            .borrowings()
            .insert(&NewBorrowing {
                member_id,
                book_id,
                borrow_date: None,
                due_date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
                return_date: None,
                staff_id: None,
            })
            .await
            .unwrap();
        db.fines()
            .insert(&NewFine {
                borrow_id,
                amount: 2.5,
                paid: None,
            })
            .await
            .unwrap();

        db.dal()
            .execute("DELETE FROM Members WHERE MemberID = ?1", &sql_params![member_id])
            .await
            .unwrap();

        assert_eq!(db.borrowings().count().await.unwrap(), 0);
        // the fine hangs off the borrowing and goes with it
        assert_eq!(db.fines().count().await.unwrap(), 0);
        assert_eq!(db.books().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_foreign_key_rejected() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let err = db.books().insert(&dune(Some(42))).await.unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_date_value() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        assert_eq!(date_value(Some(date)), Value::Text("2026-01-09".to_string()));
        assert_eq!(date_value(None), Value::Null);
    }
}
