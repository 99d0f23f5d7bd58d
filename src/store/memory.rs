//! Process-local store backing both gateways.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookRow, RepositoryError, RepositoryResult};
use crate::modules::books::models::{Book, BookId};
use crate::modules::books::repository::BookRepository;
use crate::modules::categories::models::{Category, CategoryId};
use crate::modules::categories::repository::CategoryRepository;

#[derive(Debug, Default)]
struct Tables {
    books: BTreeMap<BookId, BookRow>,
    categories: BTreeMap<CategoryId, String>,
    last_book_id: BookId,
    last_category_id: CategoryId,
}

fn next_key(last: i64, table: &'static str) -> RepositoryResult<i64> {
    last.checked_add(1).ok_or(RepositoryError::KeysExhausted(table))
}

impl Tables {
    fn load_book(&self, row: &BookRow) -> Book {
        let mut row = row.clone();
        row.category_name = row
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        Book::from(row)
    }

    fn load_category(&self, id: CategoryId, name: &str) -> Category {
        let books = self
            .books
            .values()
            .filter(|row| row.category_id == Some(id))
            .map(|row| self.load_book(row))
            .collect();
        Category::restore(id, name.to_string(), books)
    }
}

/// In-memory tables with the same key assignment and referential checks as
/// the SQLite schema. Rows are returned in key order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.values().map(|row| tables.load_book(row)).collect())
    }

    async fn find_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).map(|row| tables.load_book(row)))
    }

    async fn save(&self, book: &Book) -> RepositoryResult<Book> {
        let mut tables = self.tables.write().await;

        let category_id = book.category_id();
        if let Some(category_id) = category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(RepositoryError::UnknownCategory(category_id));
            }
        }

        let id = match book.id {
            Some(id) => id,
            None => next_key(tables.last_book_id, "books")?,
        };
        tables.last_book_id = tables.last_book_id.max(id);

        let row = BookRow {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            published_date: book.published_date,
            available: book.available,
            category_id,
            category_name: None,
        };
        let saved = tables.load_book(&row);
        tables.books.insert(id, row);
        Ok(saved)
    }

    async fn delete_by_id(&self, id: BookId) -> RepositoryResult<()> {
        self.tables.write().await.books.remove(&id);
        Ok(())
    }

    async fn find_by_category_is_null(&self) -> RepositoryResult<Vec<Book>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|row| row.category_id.is_none())
            .map(|row| tables.load_book(row))
            .collect())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .map(|(id, name)| tables.load_category(*id, name))
            .collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .get(&id)
            .map(|name| tables.load_category(id, name)))
    }

    async fn save(&self, category: &Category) -> RepositoryResult<Category> {
        let mut tables = self.tables.write().await;

        let id = match category.id() {
            Some(id) => id,
            None => next_key(tables.last_category_id, "categories")?,
        };
        tables.last_category_id = tables.last_category_id.max(id);
        tables.categories.insert(id, category.name().to_string());

        Ok(tables.load_category(id, category.name()))
    }

    async fn delete_by_id(&self, id: CategoryId) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        if tables.books.values().any(|row| row.category_id == Some(id)) {
            return Err(RepositoryError::CategoryInUse(id));
        }
        tables.categories.remove(&id);
        Ok(())
    }

    async fn count_books(&self, id: CategoryId) -> RepositoryResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|row| row.category_id == Some(id))
            .count() as u64)
    }
}
