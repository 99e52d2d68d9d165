//! Book repository

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{count_rows, fetch_all, fetch_optional, insert_row, FromRow};
use crate::database::core::{Dal, Row, Table};
use crate::sql_params;

const SELECT_BOOKS: &str = "SELECT BookID, Title, Author, ISBN, Genre, PublishedYear, \
     PublisherID, Quantity FROM Books";

/// A book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub publisher_id: Option<i64>,
    pub quantity: i64,
}

/// Fields for a new book
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: Option<String>,
    pub published_year: Option<i32>,
    pub publisher_id: Option<i64>,
    pub quantity: i64,
}

impl FromRow for Book {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("BookID")?,
            title: row.get("Title")?,
            author: row.get("Author")?,
            isbn: row.get("ISBN")?,
            genre: row.get("Genre")?,
            published_year: row.get("PublishedYear")?,
            publisher_id: row.get("PublisherID")?,
            quantity: row.get("Quantity")?,
        })
    }
}

/// Repository for book operations
pub struct BookRepository<'a> {
    dal: &'a Dal,
}

impl<'a> BookRepository<'a> {
    pub fn new(dal: &'a Dal) -> Self {
        Self { dal }
    }

    /// Insert a book, returning its id
    ///
    /// Fails with a constraint violation on a duplicate ISBN, a negative
    /// quantity or an unknown publisher.
    pub async fn insert(&self, book: &NewBook) -> Result<i64> {
        insert_row(
            self.dal,
            Table::Books,
            "INSERT INTO Books (Title, Author, ISBN, Genre, PublishedYear, PublisherID, Quantity) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            &sql_params![
                book.title.clone(),
                book.author.clone(),
                book.isbn.clone(),
                book.genre.clone(),
                book.published_year,
                book.publisher_id,
                book.quantity
            ],
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        let sql = format!("{} ORDER BY BookID", SELECT_BOOKS);
        fetch_all(self.dal, &sql, &[]).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Book>> {
        let sql = format!("{} WHERE BookID = ?1", SELECT_BOOKS);
        fetch_optional(self.dal, &sql, &sql_params![id]).await
    }

    /// Books whose title or author contains `term` (ignoring case), or whose
    /// ISBN contains it exactly
    pub async fn search(&self, term: &str) -> Result<Vec<Book>> {
        let sql = format!(
            "{} WHERE instr(LOWER(Title), LOWER(?1)) > 0 \
             OR instr(LOWER(Author), LOWER(?1)) > 0 \
             OR instr(ISBN, ?1) > 0 \
             ORDER BY BookID",
            SELECT_BOOKS
        );
        fetch_all(self.dal, &sql, &sql_params![term.to_string()]).await
    }

    /// Books from one publisher
    pub async fn by_publisher(&self, publisher_id: i64) -> Result<Vec<Book>> {
        let sql = format!("{} WHERE PublisherID = ?1 ORDER BY BookID", SELECT_BOOKS);
        fetch_all(self.dal, &sql, &sql_params![publisher_id]).await
    }

    pub async fn count(&self) -> Result<u64> {
        count_rows(self.dal, Table::Books).await
    }
}
