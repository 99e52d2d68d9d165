//! Catalog lens types
//!
//! Tagged tables for browsing and the display rows used for table output.

use crate::database::{Book, Member, Publisher, StaffMember};
use crate::lens::utils::{or_empty, truncate_name, DEFAULT_NAME_MAX_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Which catalog table to browse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum CatalogKind {
    Books,
    Publishers,
    Members,
    Staff,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Books,
        CatalogKind::Publishers,
        CatalogKind::Members,
        CatalogKind::Staff,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Publishers => "publishers",
            Self::Members => "members",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CatalogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "books" | "book" => Ok(Self::Books),
            "publishers" | "publisher" => Ok(Self::Publishers),
            "members" | "member" => Ok(Self::Members),
            "staff" => Ok(Self::Staff),
            _ => Err(format!(
                "Unknown catalog table '{}'. Valid tables: books, publishers, members, staff",
                s
            )),
        }
    }
}

/// One browsed catalog table, carrying rows of the matching record type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "kebab-case")]
pub enum CatalogTable {
    Books(Vec<Book>),
    Publishers(Vec<Publisher>),
    Members(Vec<Member>),
    Staff(Vec<StaffMember>),
}

impl CatalogTable {
    pub fn kind(&self) -> CatalogKind {
        match self {
            Self::Books(_) => CatalogKind::Books,
            Self::Publishers(_) => CatalogKind::Publishers,
            Self::Members(_) => CatalogKind::Members,
            Self::Staff(_) => CatalogKind::Staff,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Books(rows) => rows.len(),
            Self::Publishers(rows) => rows.len(),
            Self::Members(rows) => rows.len(),
            Self::Staff(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of adding a record through the lens
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedRecord {
    pub table: String,
    pub id: i64,
}

#[derive(Debug, Clone, Tabled)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub year: String,
    pub publisher: String,
    pub quantity: i64,
}

impl BookRow {
    pub fn new(book: &Book, truncate: bool) -> Self {
        Self {
            id: book.id,
            title: shorten(&book.title, truncate),
            author: shorten(&book.author, truncate),
            isbn: book.isbn.clone(),
            genre: or_empty(&book.genre),
            year: or_empty(&book.published_year),
            publisher: or_empty(&book.publisher_id),
            quantity: book.quantity,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct PublisherRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
}

impl PublisherRow {
    pub fn new(publisher: &Publisher, truncate: bool) -> Self {
        Self {
            id: publisher.id,
            name: shorten(&publisher.name, truncate),
            address: shorten(&or_empty(&publisher.address), truncate),
            email: or_empty(&publisher.email),
            phone: or_empty(&publisher.phone),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct MemberRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub membership_type: String,
    pub member_since: String,
}

impl MemberRow {
    pub fn new(member: &Member, truncate: bool) -> Self {
        Self {
            id: member.id,
            name: shorten(&member.name, truncate),
            email: member.email.clone(),
            phone: member.phone.clone(),
            address: shorten(&or_empty(&member.address), truncate),
            membership_type: or_empty(&member.membership_type_id),
            member_since: or_empty(&member.membership_date),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct StaffRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub hired: String,
}

impl StaffRow {
    pub fn new(staff: &StaffMember, truncate: bool) -> Self {
        Self {
            id: staff.id,
            name: shorten(&staff.name, truncate),
            email: staff.email.clone(),
            phone: staff.phone.clone(),
            role: or_empty(&staff.role),
            hired: or_empty(&staff.hire_date),
        }
    }
}

fn shorten(text: &str, truncate: bool) -> String {
    if truncate {
        truncate_name(text, DEFAULT_NAME_MAX_LEN)
    } else {
        text.to_string()
    }
}
