//! Gateway implementations: an in-memory store and a SQLite store.
//!
//! Each store implements both [`BookRepository`] and [`CategoryRepository`]
//! over one shared set of tables, so a category's book count always reflects
//! the books saved through the same store.
//!
//! [`BookRepository`]: crate::modules::books::repository::BookRepository
//! [`CategoryRepository`]: crate::modules::categories::repository::CategoryRepository

#[cfg(test)]
mod contract;
pub mod memory;
pub mod sqlite;

use chrono::NaiveDate;
use thiserror::Error;

use crate::modules::books::models::{Book, BookId};
use crate::modules::categories::models::{CategoryId, CategoryRef};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Failures reported by a gateway.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("category {0} does not exist")]
    UnknownCategory(CategoryId),

    #[error("category {0} is still referenced by books")]
    CategoryInUse(CategoryId),

    #[error("no keys left in table {0}")]
    KeysExhausted(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A stored book joined with its category's name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct BookRow {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub available: bool,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let mut book = Book::with_title(row.title);
        book.id = Some(row.id);
        book.author = row.author;
        book.isbn = row.isbn;
        book.published_date = row.published_date;
        book.available = row.available;
        book.set_category(
            row.category_id
                .map(|id| CategoryRef::persisted(id, row.category_name)),
        );
        book
    }
}
