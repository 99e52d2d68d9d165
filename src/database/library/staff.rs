//! Staff repository

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{count_rows, date_column, date_value, fetch_all, fetch_optional, insert_row, FromRow};
use crate::database::core::{Dal, Row, Table};
use crate::sql_params;

const SELECT_STAFF: &str = "SELECT StaffID, Name, Email, Phone, Role, HireDate FROM Staff";

/// A staff member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

/// Fields for a new staff member; `hire_date` defaults to today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaffMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

impl FromRow for StaffMember {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("StaffID")?,
            name: row.get("Name")?,
            email: row.get("Email")?,
            phone: row.get("Phone")?,
            role: row.get("Role")?,
            hire_date: date_column(row, "HireDate")?,
        })
    }
}

pub struct StaffRepository<'a> {
    dal: &'a Dal,
}

impl<'a> StaffRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    pub async fn insert(&self, staff: &NewStaffMember) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Staff,
            "INSERT INTO Staff (Name, Email, Phone, Role, HireDate) \
             VALUES (?1, ?2, ?3, ?4, COALESCE(?5, DATE('now')))",
            &sql_params![
                staff.name.clone(),
                staff.email.clone(),
                staff.phone.clone(),
                staff.role.clone(),
                date_value(staff.hire_date)
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<StaffMember>> {
        let sql = format!("{} ORDER BY StaffID", SELECT_STAFF);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<StaffMember>> {
        let sql = format!("{} WHERE StaffID = ?1", SELECT_STAFF);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Staff).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::library::tests::assert_default_date;
    use crate::database::library::LibraryDatabase;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let hired = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let id = db
            .staff()
            .insert(&NewStaffMember {
                name: "Melvil Dewey".to_string(),
                email: "dewey@example.com".to_string(),
                phone: "5550200".to_string(),
                role: Some("Librarian".to_string()),
                hire_date: Some(hired),
            })
            .await
            .unwrap();

        let stored = db.staff().get(id).await.unwrap().unwrap();
        assert_eq!(stored.role.as_deref(), Some("Librarian"));
        assert_eq!(stored.hire_date, Some(hired));
        assert_eq!(db.staff().list().await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_hire_date_defaults_to_today() {
        let db = LibraryDatabase::open_in_memory().await.unwrap();
        let before = chrono::Utc::now().date_naive();
        let id = db
            .staff()
            .insert(&NewStaffMember {
                name: "S. R. Ranganathan".to_string(),
                email: "ranganathan@example.com".to_string(),
                phone: "5550201".to_string(),
                role: None,
                hire_date: None,
            })
            .await
            .unwrap();

        let stored = db.staff().get(id).await.unwrap().unwrap();
        assert_default_date(stored.hire_date, before);
        assert_eq!(stored.role, None);
    }
}
