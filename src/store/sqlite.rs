//! SQLite gateway over the `books` and `categories` tables.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{BookRow, RepositoryError, RepositoryResult};
use crate::modules::books::models::{Book, BookId};
use crate::modules::books::repository::BookRepository;
use crate::modules::categories::models::{Category, CategoryId};
use crate::modules::categories::repository::CategoryRepository;

macro_rules! select_books {
    ($tail:literal) => {
        concat!(
            "SELECT b.id, b.title, b.author, b.isbn, b.published_date, b.available, ",
            "b.category_id, c.name AS category_name ",
            "FROM books b LEFT JOIN categories c ON c.id = b.category_id ",
            $tail
        )
    };
}

const UPSERT_BOOK: &str = "INSERT INTO books (id, title, author, isbn, published_date, available, category_id)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        title = excluded.title,
        author = excluded.author,
        isbn = excluded.isbn,
        published_date = excluded.published_date,
        available = excluded.available,
        category_id = excluded.category_id
    RETURNING id";

const UPSERT_CATEGORY: &str = "INSERT INTO categories (id, name) VALUES (?, ?)
    ON CONFLICT(id) DO UPDATE SET name = excluded.name
    RETURNING id";

/// SQLITE_CONSTRAINT_FOREIGNKEY, plus SQLITE_CONSTRAINT_TRIGGER which `ON DELETE RESTRICT` raises.
const FOREIGN_KEY_CODES: [&str; 2] = ["787", "1811"];

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.is_foreign_key_violation()
                || db
                    .code()
                    .is_some_and(|code| FOREIGN_KEY_CODES.contains(&&*code))
        }
        _ => false,
    }
}

/// Gateway backed by a SQLite pool with foreign keys enforced.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn books_by_category(&self) -> RepositoryResult<HashMap<CategoryId, Vec<Book>>> {
        let rows: Vec<BookRow> =
            sqlx::query_as(select_books!("WHERE b.category_id IS NOT NULL ORDER BY b.id"))
                .fetch_all(&self.pool)
                .await?;

        let mut grouped: HashMap<CategoryId, Vec<Book>> = HashMap::new();
        for row in rows {
            if let Some(category_id) = row.category_id {
                grouped.entry(category_id).or_default().push(Book::from(row));
            }
        }
        Ok(grouped)
    }
}

#[async_trait]
impl BookRepository for SqliteStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(select_books!("ORDER BY b.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(select_books!("WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn save(&self, book: &Book) -> RepositoryResult<Book> {
        let category_id = book.category_id();
        let id: BookId = sqlx::query_scalar(UPSERT_BOOK)
            .bind(book.id)
            .bind(&book.title)
            .bind(&book.author)
            .bind(&book.isbn)
            .bind(book.published_date)
            .bind(book.available)
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match category_id {
                Some(category_id) if is_foreign_key_violation(&err) => {
                    RepositoryError::UnknownCategory(category_id)
                }
                _ => RepositoryError::Database(err),
            })?;

        tracing::debug!(target: "bookstore-db", book_id = id, "book row written");
        BookRepository::find_by_id(self, id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn delete_by_id(&self, id: BookId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_category_is_null(&self) -> RepositoryResult<Vec<Book>> {
        let rows: Vec<BookRow> =
            sqlx::query_as(select_books!("WHERE b.category_id IS NULL ORDER BY b.id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }
}

#[async_trait]
impl CategoryRepository for SqliteStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        let rows: Vec<(CategoryId, String)> =
            sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let mut books = self.books_by_category().await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Category::restore(id, name, books.remove(&id).unwrap_or_default()))
            .collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let row: Option<(CategoryId, String)> =
            sqlx::query_as("SELECT id, name FROM categories WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        let Some((id, name)) = row else {
            return Ok(None);
        };

        let rows: Vec<BookRow> = sqlx::query_as(select_books!("WHERE b.category_id = ? ORDER BY b.id"))
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        let books = rows.into_iter().map(Book::from).collect();
        Ok(Some(Category::restore(id, name, books)))
    }

    async fn save(&self, category: &Category) -> RepositoryResult<Category> {
        let id: CategoryId = sqlx::query_scalar(UPSERT_CATEGORY)
            .bind(category.id())
            .bind(category.name())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(target: "bookstore-db", category_id = id, "category row written");
        CategoryRepository::find_by_id(self, id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn delete_by_id(&self, id: CategoryId) -> RepositoryResult<()> {
        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    RepositoryError::CategoryInUse(id)
                } else {
                    RepositoryError::Database(err)
                }
            })?;
        Ok(())
    }

    async fn count_books(&self, id: CategoryId) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}
