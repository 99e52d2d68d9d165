//! Member and membership type repositories

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{count_rows, date_column, date_value, fetch_all, fetch_optional, insert_row, FromRow};
use crate::database::core::{Dal, Row, Table};
use crate::sql_params;

const SELECT_MEMBERSHIP_TYPES: &str =
    "SELECT MembershipTypeID, TypeName, DurationMonths, Fee FROM MembershipTypes";
const SELECT_MEMBERS: &str = "SELECT MemberID, Name, Email, Phone, Address, MembershipTypeID, \
     MembershipDate FROM Members";

/// A membership plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipType {
    pub id: i64,
    pub type_name: String,
    pub duration_months: i64,
    pub fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMembershipType {
    pub type_name: String,
    pub duration_months: i64,
    pub fee: f64,
}

/// A library member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub membership_type_id: Option<i64>,
    pub membership_date: Option<NaiveDate>,
}

/// Fields for a new member
///
/// `membership_date` defaults to the current date when `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub membership_type_id: Option<i64>,
    pub membership_date: Option<NaiveDate>,
}

impl FromRow for MembershipType {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("MembershipTypeID")?,
            type_name: row.get("TypeName")?,
            duration_months: row.get("DurationMonths")?,
            fee: row.get("Fee")?,
        })
    }
}

impl FromRow for Member {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("MemberID")?,
            name: row.get("Name")?,
            email: row.get("Email")?,
            phone: row.get("Phone")?,
            address: row.get("Address")?,
            membership_type_id: row.get("MembershipTypeID")?,
            membership_date: date_column(row, "MembershipDate")?,
        })
    }
}

pub struct MembershipTypeRepository<'a> {
    dal: &'a Dal,
}

impl<'a> MembershipTypeRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    pub async fn insert(&self, membership: &NewMembershipType) -> Result<i64> {
        insert_row(
            self.dal,
            Table::MembershipTypes,
            "INSERT INTO MembershipTypes (TypeName, DurationMonths, Fee) VALUES (?1, ?2, ?3)",
            &sql_params![
                membership.type_name.clone(),
                membership.duration_months,
                membership.fee
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<MembershipType>> {
        let sql = format!("{} ORDER BY MembershipTypeID", SELECT_MEMBERSHIP_TYPES);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<MembershipType>> {
        let sql = format!("{} WHERE MembershipTypeID = ?1", SELECT_MEMBERSHIP_TYPES);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::MembershipTypes).await
    }
}

/// Repository for member operations
pub struct MemberRepository<'a> {
    dal: &'a Dal,
}

impl<'a> MemberRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    /// Insert a member, returning its id
    pub async fn insert(&self, member: &NewMember) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Members,
            "INSERT INTO Members (Name, Email, Phone, Address, MembershipTypeID, MembershipDate) \
             VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, DATE('now')))",
            &sql_params![
                member.name.clone(),
                member.email.clone(),
                member.phone.clone(),
                member.address.clone(),
                member.membership_type_id,
                date_value(member.membership_date)
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        let sql = format!("{} ORDER BY MemberID", SELECT_MEMBERS);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Member>> {
        let sql = format!("{} WHERE MemberID = ?1", SELECT_MEMBERS);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Members).await
    }
}
