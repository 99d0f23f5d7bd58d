use std::sync::Arc;

use crate::error::CatalogResult;
use crate::modules::books::models::{Book, BookId};
use crate::modules::books::repository::BookRepository;

/// CRUD orchestration for books.
#[derive(Clone)]
pub struct BookService {
    repository: Arc<dyn BookRepository>,
}

impl BookService {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_all(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.repository.find_all().await?)
    }

    pub async fn get_by_id(&self, id: BookId) -> CatalogResult<Option<Book>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Create or upsert `book`, returning it with its stored identity.
    pub async fn save(&self, book: &Book) -> CatalogResult<Book> {
        let saved = self.repository.save(book).await?;
        tracing::info!(book_id = ?saved.id, title = %saved.title, "book saved");
        Ok(saved)
    }

    /// Replace every mutable field of the book at `id` with those of
    /// `changes`, including its category.
    ///
    /// Returns `None` without writing anything when no book exists at `id`.
    pub async fn update(&self, id: BookId, changes: Book) -> CatalogResult<Option<Book>> {
        let Some(mut existing) = self.repository.find_by_id(id).await? else {
            tracing::debug!(book_id = id, "update skipped, book not found");
            return Ok(None);
        };

        existing.set_category(changes.category().cloned());
        existing.title = changes.title;
        existing.author = changes.author;
        existing.isbn = changes.isbn;
        existing.published_date = changes.published_date;
        existing.available = changes.available;

        let saved = self.repository.save(&existing).await?;
        tracing::info!(book_id = id, "book updated");
        Ok(Some(saved))
    }

    pub async fn delete(&self, id: BookId) -> CatalogResult<()> {
        self.repository.delete_by_id(id).await?;
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Books that belong to no category.
    pub async fn list_uncategorized(&self) -> CatalogResult<Vec<Book>> {
        Ok(self.repository.find_by_category_is_null().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::modules::books::repository::MockBookRepository;
    use crate::modules::categories::models::CategoryRef;
    use crate::store::RepositoryError;
    use mockall::predicate::eq;

    fn service(repository: MockBookRepository) -> BookService {
        BookService::new(Arc::new(repository))
    }

    fn stored(id: BookId, title: &str) -> Book {
        let mut book = Book::with_title(title);
        book.id = Some(id);
        book
    }

    #[tokio::test]
    async fn list_all_returns_gateway_books() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_find_all()
            .times(1)
            .returning(|| Ok(vec![stored(1, "Dune"), stored(2, "Emma")]));

        let books = service(repository).list_all().await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[1].title, "Emma");
    }

    #[tokio::test]
    async fn get_by_id_distinguishes_absent() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(stored(1, "Dune"))));
        repository
            .expect_find_by_id()
            .with(eq(2))
            .returning(|_| Ok(None));

        let service = service(repository);
        assert_eq!(service.get_by_id(1).await.unwrap().unwrap().title, "Dune");
        assert!(service.get_by_id(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_returns_persisted_identity() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_save()
            .withf(|book| book.id.is_none() && book.title == "Dune")
            .times(1)
            .returning(|book| {
                let mut saved = book.clone();
                saved.id = Some(10);
                Ok(saved)
            });

        let saved = service(repository)
            .save(&Book::with_title("Dune"))
            .await
            .unwrap();
        assert_eq!(saved.id, Some(10));
    }

    #[tokio::test]
    async fn update_missing_book_leaves_store_untouched() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_find_by_id()
            .with(eq(99))
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_save().never();

        let result = service(repository)
            .update(99, Book::with_title("New"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let mut repository = MockBookRepository::new();
        repository.expect_find_by_id().with(eq(5)).returning(|_| {
            let mut old = stored(5, "Old");
            old.author = Some("OldA".to_string());
            old.isbn = Some("0".to_string());
            old.available = false;
            old.set_category(Some(CategoryRef::persisted(1, Some("C1".to_string()))));
            Ok(Some(old))
        });
        repository
            .expect_save()
            .withf(|book| {
                book.id == Some(5)
                    && book.title == "New"
                    && book.author.as_deref() == Some("NewA")
                    && book.isbn.as_deref() == Some("1")
                    && book.available
                    && book.category_id() == Some(2)
            })
            .times(1)
            .returning(|book| Ok(book.clone()));

        let mut changes = Book::with_title("New");
        changes.author = Some("NewA".to_string());
        changes.isbn = Some("1".to_string());
        changes.available = true;
        changes.set_category(Some(CategoryRef::persisted(2, Some("C2".to_string()))));

        let updated = service(repository)
            .update(5, changes)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "New");
        assert_eq!(updated.author.as_deref(), Some("NewA"));
        assert_eq!(updated.isbn.as_deref(), Some("1"));
        assert!(updated.available);
        assert_eq!(updated.category_id(), Some(2));
    }

    #[tokio::test]
    async fn update_does_not_preserve_omitted_fields() {
        let mut repository = MockBookRepository::new();
        repository.expect_find_by_id().returning(|_| {
            let mut old = stored(5, "Old");
            old.author = Some("OldA".to_string());
            old.set_category(Some(CategoryRef::persisted(1, None)));
            Ok(Some(old))
        });
        repository
            .expect_save()
            .withf(|book| book.author.is_none() && book.category().is_none())
            .times(1)
            .returning(|book| Ok(book.clone()));

        let updated = service(repository)
            .update(5, Book::with_title("New"))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.author.is_none());
    }

    #[tokio::test]
    async fn update_with_unknown_category_is_invalid() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(stored(5, "Old"))));
        repository
            .expect_save()
            .returning(|_| Err(RepositoryError::UnknownCategory(42)));

        let mut changes = Book::with_title("New");
        changes.set_category(Some(CategoryRef::persisted(42, None)));

        let err = service(repository).update(5, changes).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn delete_is_unconditional() {
        let mut repository = MockBookRepository::new();
        repository
            .expect_delete_by_id()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(()));

        service(repository).delete(3).await.unwrap();
    }

    #[tokio::test]
    async fn list_uncategorized_uses_null_category_query() {
        let mut repository = MockBookRepository::new();
        repository.expect_find_all().never();
        repository
            .expect_find_by_category_is_null()
            .times(1)
            .returning(|| Ok(vec![stored(2, "Emma"), stored(3, "Dune")]));

        let books = service(repository).list_uncategorized().await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(books.iter().all(|book| book.category().is_none()));
    }
}
