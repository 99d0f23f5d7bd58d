use async_trait::async_trait;

use crate::modules::books::models::{Book, BookId};
use crate::store::RepositoryResult;

/// Persistence gateway for books.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn find_all(&self) -> RepositoryResult<Vec<Book>>;

    async fn find_by_id(&self, id: BookId) -> RepositoryResult<Option<Book>>;

    /// Insert when `book.id` is `None`, otherwise upsert at that key.
    /// Returns the stored book as read back from the store.
    async fn save(&self, book: &Book) -> RepositoryResult<Book>;

    /// Deleting a missing key is not an error.
    async fn delete_by_id(&self, id: BookId) -> RepositoryResult<()>;

    async fn find_by_category_is_null(&self) -> RepositoryResult<Vec<Book>>;
}
