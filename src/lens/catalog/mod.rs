//! Catalog lens
//!
//! Browse, search and add catalog records, and format them for output. This is
//! the layer front ends talk to; it never issues SQL itself.

pub mod args;
pub mod types;

pub use args::{
    AddBookArgs, AddMemberArgs, AddMembershipTypeArgs, AddPublisherArgs, AddStaffArgs,
    BookSearchArgs, BrowseArgs,
};
pub use types::{
    AddedRecord, BookRow, CatalogKind, CatalogTable, MemberRow, PublisherRow, StaffRow,
};

use crate::database::{Book, LibraryDatabase, Table};
use crate::lens::utils::{render_rows, OutputFormat};
use anyhow::{anyhow, Result};

/// Catalog lens over a [`LibraryDatabase`]
pub struct CatalogLens<'a> {
    db: &'a LibraryDatabase,
}

impl<'a> CatalogLens<'a> {
    pub fn new(db: &'a LibraryDatabase) -> Self {
        Self { db }
    }

    /// Load every row of one catalog table
    pub async fn browse(&self, kind: CatalogKind) -> Result<CatalogTable> {
        Ok(match kind {
            CatalogKind::Books => CatalogTable::Books(self.db.books().list().await?),
            CatalogKind::Publishers => {
                CatalogTable::Publishers(self.db.publishers().list().await?)
            }
            CatalogKind::Members => CatalogTable::Members(self.db.members().list().await?),
            CatalogKind::Staff => CatalogTable::Staff(self.db.staff().list().await?),
        })
    }

    pub async fn search_books(&self, args: &BookSearchArgs) -> Result<Vec<Book>> {
        args.validate().map_err(|e| anyhow!(e))?;
        self.db.books().search(args.term.trim()).await
    }

    pub async fn add_publisher(&self, args: &AddPublisherArgs) -> Result<AddedRecord> {
        args.validate().map_err(|e| anyhow!(e))?;
        let id = self.db.publishers().insert(&args.to_record()).await?;
        Ok(added(Table::Publishers, id))
    }

    pub async fn add_book(&self, args: &AddBookArgs) -> Result<AddedRecord> {
        args.validate().map_err(|e| anyhow!(e))?;
        let id = self.db.books().insert(&args.to_record()).await?;
        Ok(added(Table::Books, id))
    }

    pub async fn add_member(&self, args: &AddMemberArgs) -> Result<AddedRecord> {
        args.validate().map_err(|e| anyhow!(e))?;
        let id = self.db.members().insert(&args.to_record()).await?;
        Ok(added(Table::Members, id))
    }

    pub async fn add_staff(&self, args: &AddStaffArgs) -> Result<AddedRecord> {
        args.validate().map_err(|e| anyhow!(e))?;
        let id = self.db.staff().insert(&args.to_record()).await?;
        Ok(added(Table::Staff, id))
    }

    pub async fn add_membership_type(&self, args: &AddMembershipTypeArgs) -> Result<AddedRecord> {
        args.validate().map_err(|e| anyhow!(e))?;
        let id = self.db.membership_types().insert(&args.to_record()).await?;
        Ok(added(Table::MembershipTypes, id))
    }

    /// Format a browsed table
    ///
    /// When `truncate` is true, long names are shortened in table output. JSON
    /// output always carries full records.
    pub fn format_table(
        &self,
        table: &CatalogTable,
        format: &OutputFormat,
        truncate: bool,
    ) -> Result<String> {
        match table {
            CatalogTable::Books(books) => self.format_books(books, format, truncate),
            CatalogTable::Publishers(publishers) => {
                let rows: Vec<_> = publishers
                    .iter()
                    .map(|p| PublisherRow::new(p, truncate))
                    .collect();
                render_rows(publishers, &rows, format)
            }
            CatalogTable::Members(members) => {
                let rows: Vec<_> = members
                    .iter()
                    .map(|m| MemberRow::new(m, truncate))
                    .collect();
                render_rows(members, &rows, format)
            }
            CatalogTable::Staff(staff) => {
                let rows: Vec<_> = staff.iter().map(|s| StaffRow::new(s, truncate)).collect();
                render_rows(staff, &rows, format)
            }
        }
    }

    pub fn format_books(
        &self,
        books: &[Book],
        format: &OutputFormat,
        truncate: bool,
    ) -> Result<String> {
        let rows: Vec<_> = books.iter().map(|b| BookRow::new(b, truncate)).collect();
        render_rows(books, &rows, format)
    }

    pub fn format_added(&self, record: &AddedRecord, format: &OutputFormat) -> Result<String> {
        if format.is_json() {
            format.render_value(record)
        } else {
            Ok(format!("Added {} record with id {}", record.table, record.id))
        }
    }
}

fn added(table: Table, id: i64) -> AddedRecord {
    AddedRecord {
        table: table.name().to_string(),
        id,
    }
}
