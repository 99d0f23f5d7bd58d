use async_trait::async_trait;

use crate::modules::categories::models::{Category, CategoryId};
use crate::store::RepositoryResult;

/// Persistence gateway for categories.
///
/// Loaded categories carry the books the store assigns to them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_all(&self) -> RepositoryResult<Vec<Category>>;

    async fn find_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;

    /// Persists the name only; membership is stored from the book side.
    async fn save(&self, category: &Category) -> RepositoryResult<Category>;

    /// Fails with `CategoryInUse` while books still reference `id`.
    async fn delete_by_id(&self, id: CategoryId) -> RepositoryResult<()>;

    /// Number of stored books whose category is `id`.
    async fn count_books(&self, id: CategoryId) -> RepositoryResult<u64>;
}
