//! Publisher repository

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{count_rows, fetch_all, fetch_optional, insert_row, FromRow};
use crate::database::core::{Dal, Row, Table};
use crate::sql_params;

const SELECT_PUBLISHERS: &str = "SELECT PublisherID, Name, Address, Email, Phone FROM Publishers";

/// A publisher record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Fields for a new publisher; email and phone must be unique when present
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPublisher {
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl FromRow for Publisher {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("PublisherID")?,
            name: row.get("Name")?,
            address: row.get("Address")?,
            email: row.get("Email")?,
            phone: row.get("Phone")?,
        })
    }
}

/// Repository for publisher operations
pub struct PublisherRepository<'a> {
    dal: &'a Dal,
}

impl<'a> PublisherRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    /// Insert a publisher, returning its id
    pub async fn insert(&self, publisher: &NewPublisher) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Publishers,
            "INSERT INTO Publishers (Name, Address, Email, Phone) VALUES (?1, ?2, ?3, ?4)",
            &sql_params![
                publisher.name.clone(),
                publisher.address.clone(),
                publisher.email.clone(),
                publisher.phone.clone()
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Publisher>> {
        let sql = format!("{} ORDER BY PublisherID", SELECT_PUBLISHERS);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Publisher>> {
        let sql = format!("{} WHERE PublisherID = ?1", SELECT_PUBLISHERS);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Publishers).await
    }
}
