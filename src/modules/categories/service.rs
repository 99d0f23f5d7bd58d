use std::sync::Arc;

use crate::error::{CatalogError, CatalogResult, CATEGORY_HAS_BOOKS};
use crate::modules::categories::models::{Category, CategoryId};
use crate::modules::categories::repository::CategoryRepository;

/// CRUD orchestration for categories, guarding deletes of categories that
/// still have books.
#[derive(Clone)]
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repository: Arc<dyn CategoryRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_all(&self) -> CatalogResult<Vec<Category>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn get_by_id(&self, id: CategoryId) -> CatalogResult<Option<Category>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn save(&self, category: &Category) -> CatalogResult<Category> {
        let saved = self.repository.save(category).await?;
        tracing::info!(category_id = ?saved.id(), name = %saved.name(), "category saved");
        Ok(saved)
    }

    /// Delete the category at `id`.
    ///
    /// Rejected with `ConstraintViolation` while the store holds books in
    /// this category. The check and the delete are not atomic; a foreign key
    /// failure from the store during the delete is reported the same way.
    pub async fn delete(&self, id: CategoryId) -> CatalogResult<()> {
        if self.has_books(id).await? {
            tracing::warn!(category_id = id, "refusing to delete category with books");
            return Err(CatalogError::ConstraintViolation(
                CATEGORY_HAS_BOOKS.to_string(),
            ));
        }

        self.repository.delete_by_id(id).await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }

    /// Whether any stored book references `id`.
    pub async fn has_books(&self, id: CategoryId) -> CatalogResult<bool> {
        Ok(self.repository.count_books(id).await? > 0)
    }

    /// Replace the name of the category at `id`; `None` when absent.
    pub async fn rename(
        &self,
        id: CategoryId,
        name: impl Into<String>,
    ) -> CatalogResult<Option<Category>> {
        let Some(mut category) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };
        category.set_name(name);
        let saved = self.repository.save(&category).await?;
        tracing::info!(category_id = id, name = %saved.name(), "category renamed");
        Ok(Some(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::Book;
    use crate::modules::categories::repository::MockCategoryRepository;
    use crate::store::RepositoryError;
    use mockall::predicate::eq;

    fn service(repository: MockCategoryRepository) -> CategoryService {
        CategoryService::new(Arc::new(repository))
    }

    fn stored(id: CategoryId, name: &str) -> Category {
        Category::restore(id, name.to_string(), Vec::new())
    }

    #[tokio::test]
    async fn list_all_returns_gateway_categories() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_find_all()
            .returning(|| Ok(vec![stored(1, "Fiction"), stored(2, "Science")]));

        let categories = service(repository).list_all().await.unwrap();
        let names: Vec<_> = categories.iter().map(Category::name).collect();
        assert_eq!(names, ["Fiction", "Science"]);
    }

    #[tokio::test]
    async fn get_by_id_distinguishes_absent() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(stored(1, "Fiction"))));
        repository
            .expect_find_by_id()
            .with(eq(2))
            .returning(|_| Ok(None));

        let service = service(repository);
        assert_eq!(service.get_by_id(1).await.unwrap().unwrap().id(), Some(1));
        assert!(service.get_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_returns_persisted_identity() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_save()
            .withf(|category| category.name() == "Fiction")
            .times(1)
            .returning(|category| {
                let mut saved = category.clone();
                saved.set_id(Some(4));
                Ok(saved)
            });

        let saved = service(repository)
            .save(&Category::new("Fiction"))
            .await
            .unwrap();
        assert_eq!(saved.id(), Some(4));
    }

    #[tokio::test]
    async fn delete_without_books_succeeds() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_count_books()
            .with(eq(1))
            .returning(|_| Ok(0));
        repository
            .expect_delete_by_id()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        service(repository).delete(1).await.unwrap();
    }

    #[tokio::test]
    async fn delete_with_books_is_a_constraint_violation() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_count_books()
            .with(eq(1))
            .returning(|_| Ok(2));
        repository.expect_delete_by_id().never();

        let err = service(repository).delete(1).await.unwrap_err();
        match err {
            CatalogError::ConstraintViolation(message) => {
                assert!(message.contains("cannot be deleted"))
            }
            other => panic!("expected constraint violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_checks_the_store_not_the_loaded_collection() {
        // A stale in-memory category with books does not block the delete.
        let mut stale = stored(1, "Fiction");
        stale.add_book(Book::with_title("Dune")).unwrap();
        assert!(!stale.books().is_empty());

        let mut repository = MockCategoryRepository::new();
        repository.expect_find_by_id().never();
        repository.expect_count_books().returning(|_| Ok(0));
        repository.expect_delete_by_id().times(1).returning(|_| Ok(()));

        service(repository).delete(1).await.unwrap();
    }

    #[tokio::test]
    async fn delete_racing_a_book_insert_is_a_constraint_violation() {
        let mut repository = MockCategoryRepository::new();
        repository.expect_count_books().returning(|_| Ok(0));
        repository
            .expect_delete_by_id()
            .returning(|id| Err(RepositoryError::CategoryInUse(id)));

        let err = service(repository).delete(1).await.unwrap_err();
        assert!(matches!(err, CatalogError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn has_books_reflects_store_count() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_count_books()
            .with(eq(1))
            .returning(|_| Ok(1));
        repository
            .expect_count_books()
            .with(eq(2))
            .returning(|_| Ok(0));

        let service = service(repository);
        assert!(service.has_books(1).await.unwrap());
        assert!(!service.has_books(2).await.unwrap());
    }

    #[tokio::test]
    async fn rename_missing_category_returns_none() {
        let mut repository = MockCategoryRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository.expect_save().never();

        assert!(service(repository)
            .rename(7, "Science")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rename_saves_the_new_name() {
        let mut repository = MockCategoryRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored(7, "Sci"))));
        repository
            .expect_save()
            .withf(|category| category.id() == Some(7) && category.name() == "Science")
            .times(1)
            .returning(|category| Ok(category.clone()));

        let renamed = service(repository)
            .rename(7, "Science")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name(), "Science");
    }
}
