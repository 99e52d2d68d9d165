//! Circulation records: borrowings, fines and reservations

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::{count_rows, date_column, date_value, fetch_all, fetch_optional, insert_row, FromRow};
use crate::database::core::{Dal, Row, Table};
use crate::sql_params;

const SELECT_BORROWINGS: &str = "SELECT BorrowID, MemberID, BookID, BorrowDate, DueDate, \
     ReturnDate, StaffID FROM Borrowings";
const SELECT_FINES: &str = "SELECT FineID, BorrowID, Amount, Paid FROM Fines";
const SELECT_RESERVATIONS: &str =
    "SELECT ReservationID, MemberID, BookID, ReservationDate, Status FROM Reservations";

/// A book lent to a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Borrowing {
    pub id: i64,
    pub member_id: Option<i64>,
    pub book_id: Option<i64>,
    pub borrow_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub staff_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBorrowing {
    pub member_id: i64,
    pub book_id: i64,
    /// Defaults to today
    pub borrow_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub staff_id: Option<i64>,
}

/// A fine charged against a borrowing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fine {
    pub id: i64,
    pub borrow_id: Option<i64>,
    pub amount: f64,
    pub paid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFine {
    pub borrow_id: i64,
    pub amount: f64,
    /// Defaults to unpaid
    pub paid: Option<bool>,
}

/// Lifecycle of a reservation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Display for ReservationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(anyhow!("Unknown reservation status '{}'", other)),
        }
    }
}

/// A member's hold on a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub member_id: Option<i64>,
    pub book_id: Option<i64>,
    pub reservation_date: Option<NaiveDate>,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReservation {
    pub member_id: i64,
    pub book_id: i64,
    /// Defaults to today
    pub reservation_date: Option<NaiveDate>,
    /// Defaults to [`ReservationStatus::Pending`]
    pub status: Option<ReservationStatus>,
}

impl FromRow for Borrowing {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("BorrowID")?,
            member_id: row.get("MemberID")?,
            book_id: row.get("BookID")?,
            borrow_date: date_column(row, "BorrowDate")?,
            due_date: date_column(row, "DueDate")?
                .ok_or_else(|| anyhow!("Borrowing has no due date"))?,
            return_date: date_column(row, "ReturnDate")?,
            staff_id: row.get("StaffID")?,
        })
    }
}

impl FromRow for Fine {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("FineID")?,
            borrow_id: row.get("BorrowID")?,
            amount: row.get("Amount")?,
            paid: row.get("Paid")?,
        })
    }
}

impl FromRow for Reservation {
    fn from_row(row: &Row) -> Result<Self> {
        let status: String = row.get("Status")?;
        Ok(Self {
            id: row.get("ReservationID")?,
            member_id: row.get("MemberID")?,
            book_id: row.get("BookID")?,
            reservation_date: date_column(row, "ReservationDate")?,
            status: status.parse()?,
        })
    }
}

pub struct BorrowingRepository<'a> {
    dal: &'a Dal,
}

impl<'a> BorrowingRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    pub async fn insert(&self, borrowing: &NewBorrowing) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Borrowings,
            "INSERT INTO Borrowings (MemberID, BookID, BorrowDate, DueDate, ReturnDate, StaffID) \
             VALUES (?1, ?2, COALESCE(?3, DATE('now')), ?4, ?5, ?6)",
            &sql_params![
                borrowing.member_id,
                borrowing.book_id,
                date_value(borrowing.borrow_date),
                date_value(Some(borrowing.due_date)),
                date_value(borrowing.return_date),
                borrowing.staff_id
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Borrowing>> {
        let sql = format!("{} ORDER BY BorrowID", SELECT_BORROWINGS);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Borrowing>> {
        let sql = format!("{} WHERE BorrowID = ?1", SELECT_BORROWINGS);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    /// Borrowings of one member, oldest first
    pub async fn for_member(&self, member_id: i64) -> Result<Vec<Borrowing>> {
        let sql = format!("{} WHERE MemberID = ?1 ORDER BY BorrowID", SELECT_BORROWINGS);
        fetch_all(self.dal, &sql, &sql_params![member_id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Borrowings).await
    }
}

pub struct FineRepository<'a> {
    dal: &'a Dal,
}

impl<'a> FineRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    pub async fn insert(&self, fine: &NewFine) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Fines,
            "INSERT INTO Fines (BorrowID, Amount, Paid) VALUES (?1, ?2, COALESCE(?3, FALSE))",
            &sql_params![fine.borrow_id, fine.amount, fine.paid],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Fine>> {
        let sql = format!("{} ORDER BY FineID", SELECT_FINES);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Fine>> {
        let sql = format!("{} WHERE FineID = ?1", SELECT_FINES);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Fines).await
    }
}

pub struct ReservationRepository<'a> {
    dal: &'a Dal,
}

impl<'a> ReservationRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    pub async fn insert(&self, reservation: &NewReservation) -> Result<i64> {
        let status = reservation
            .status
            .map(|s| Value::Text(s.as_str().to_string()))
            .unwrap_or(Value::Null);
        insert_row(
            self.dal,
            Table::Reservations,
            "INSERT INTO Reservations (MemberID, BookID, ReservationDate, Status) \
             VALUES (?1, ?2, COALESCE(?3, DATE('now')), COALESCE(?4, 'Pending'))",
            &sql_params![
                reservation.member_id,
                reservation.book_id,
                date_value(reservation.reservation_date),
                status
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Reservation>> {
        let sql = format!("{} ORDER BY ReservationID", SELECT_RESERVATIONS);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Reservation>> {
        let sql = format!("{} WHERE ReservationID = ?1", SELECT_RESERVATIONS);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn with_status(&self, status: ReservationStatus) -> Result<Vec<Reservation>> {
        let sql = format!("{} WHERE Status = ?1 ORDER BY ReservationID", SELECT_RESERVATIONS);
        fetch_all(self.dal, &sql, &sql_params![status.as_str().to_string()]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Reservations).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{classify, DbErrorKind};
    use crate::database::library::tests::{assert_default_date, dune};
    use crate::database::library::{LibraryDatabase, NewMember, NewStaffMember};

    struct Fixture {
        db: LibraryDatabase,
        member_id: i64,
        book_id: i64,
        staff_id: i64,
    }

    async fn fixture() -> Fixture {
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
        let staff_id = db
            .staff()
            .insert(&NewStaffMember {
                name: "Melvil Dewey".to_string(),
                email: "dewey@example.com".to_string(),
                phone: "5550200".to_string(),
                role: None,
                hire_date: None,
            })
            .await
            .unwrap();
        Fixture {
            db,
            member_id,
            book_id,
            staff_id,
        }
    }

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    #[tokio::test]
    async fn test_borrowing_round_trip() {
        let f = fixture().await;
        let before = chrono::Utc::now().date_naive();
        let id = f
            .db
            .borrowings()
            .insert(&NewBorrowing {
                member_id: f.member_id,
                book_id: f.book_id,
                borrow_date: None,
                due_date: due(),
                return_date: None,
                staff_id: Some(f.staff_id),
            })
            .await
            .unwrap();

        let stored = f.db.borrowings().get(id).await.unwrap().unwrap();
        assert_eq!(stored.due_date, due());
        assert_default_date(stored.borrow_date, before);
        assert_eq!(stored.return_date, None);
        assert_eq!(stored.staff_id, Some(f.staff_id));
        assert_eq!(f.db.borrowings().for_member(f.member_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_staff_nulls_borrowing_reference() {
        let f = fixture().await;
        let id = f
            .db
            .borrowings()
            .insert(&NewBorrowing {
                member_id: f.member_id,
                book_id: f.book_id,
                borrow_date: None,
                due_date: due(),
                return_date: None,
                staff_id: Some(f.staff_id),
            })
            .await
            .unwrap();

        f.db.dal()
            .execute("DELETE FROM Staff WHERE StaffID = ?1", &sql_params![f.staff_id])
            .await
            .unwrap();

        let stored = f.db.borrowings().get(id).await.unwrap().unwrap();
        assert_eq!(stored.staff_id, None);
    }

    #[tokio::test]
    async fn test_fine_defaults_to_unpaid() {
        let f = fixture().await;
        let borrow_id = f
            .db
            .borrowings()
            .insert(&NewBorrowing {
                member_id: f.member_id,
                book_id: f.book_id,
                borrow_date: None,
                due_date: due(),
                return_date: None,
                staff_id: None,
            })
            .await
            .unwrap();

        let unpaid = f
            .db
            .fines()
            .insert(&NewFine {
                borrow_id,
                amount: 1.25,
                paid: None,
            })
            .await
            .unwrap();
        let paid = f
            .db
            .fines()
            .insert(&NewFine {
                borrow_id,
                amount: 3.0,
                paid: Some(true),
            })
            .await
            .unwrap();

        assert!(!f.db.fines().get(unpaid).await.unwrap().unwrap().paid);
        let paid = f.db.fines().get(paid).await.unwrap().unwrap();
        assert!(paid.paid);
        assert!((paid.amount - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_reservation_status_defaults_to_pending() {
        let f = fixture().await;
        let repo = f.db.reservations();

        let pending = repo
            .insert(&NewReservation {
                member_id: f.member_id,
                book_id: f.book_id,
                reservation_date: None,
                status: None,
            })
            .await
            .unwrap();
        repo.insert(&NewReservation {
            member_id: f.member_id,
            book_id: f.book_id,
            reservation_date: None,
            status: Some(ReservationStatus::Cancelled),
        })
        .await
        .unwrap();

        let stored = repo.get(pending).await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert_eq!(
            repo.with_status(ReservationStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_reservation_status_checked_by_engine() {
        let f = fixture().await;
        let err = f
            .db
            .dal()
            .execute(
                "INSERT INTO Reservations (MemberID, BookID, Status) VALUES (?1, ?2, 'Lost')",
                &sql_params![f.member_id, f.book_id],
            )
            .await
            .unwrap_err();
        assert_eq!(classify(&err), DbErrorKind::ConstraintViolation);
    }

    async fn reserve_and_borrow(f: &Fixture) {
        f.db.reservations()
            .insert(&NewReservation {
                member_id: f.member_id,
                book_id: f.book_id,
                reservation_date: None,
                status: None,
            })
            .await
            .unwrap();
        f.db.borrowings()
            .insert(&NewBorrowing {
                member_id: f.member_id,
                book_id: f.book_id,
                borrow_date: None,
                due_date: due(),
                return_date: None,
                staff_id: Some(f.staff_id),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_deleting_book_cascades_circulation() {
        let f = fixture().await;
        reserve_and_borrow(&f).await;

        f.db.dal()
            .execute("DELETE FROM Books WHERE BookID = ?1", &sql_params![f.book_id])
            .await
            .unwrap();
        assert_eq!(f.db.reservations().count().await.unwrap(), 0);
        assert_eq!(f.db.borrowings().count().await.unwrap(), 0);
        assert_eq!(f.db.members().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_member_cascades_reservations() {
        let f = fixture().await;
        reserve_and_borrow(&f).await;

        f.db.dal()
            .execute(
                "DELETE FROM Members WHERE MemberID = ?1",
                &sql_params![f.member_id],
            )
            .await
            .unwrap();
        assert_eq!(f.db.reservations().count().await.unwrap(), 0);
        assert_eq!(f.db.borrowings().count().await.unwrap(), 0);
        assert_eq!(f.db.books().count().await.unwrap(), 1);
    }

    #[test]
    fn test_reservation_status_parse() {
        assert_eq!(
            "Completed".parse::<ReservationStatus>().unwrap(),
            ReservationStatus::Completed
        );
        assert!("pending".parse::<ReservationStatus>().is_err());
        assert_eq!(ReservationStatus::default().to_string(), "Pending");
    }
}
