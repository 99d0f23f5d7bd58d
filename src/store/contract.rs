//! Behaviour every gateway implementation must share.

use chrono::NaiveDate;

use super::RepositoryError;
use crate::modules::books::models::Book;
use crate::modules::books::repository::BookRepository;
use crate::modules::categories::models::{Category, CategoryRef};
use crate::modules::categories::repository::CategoryRepository;

async fn saved_category<S>(store: &S, name: &str) -> Category
where
    S: CategoryRepository,
{
    CategoryRepository::save(store, &Category::new(name))
        .await
        .unwrap()
}

pub async fn book_round_trip<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut book = Book::with_title("Refactoring");
    book.author = Some("Martin Fowler".to_string());
    book.isbn = Some("9780201485677".to_string());
    book.published_date = NaiveDate::from_ymd_opt(1999, 7, 8);
    book.available = true;

    let saved = BookRepository::save(store, &book).await.unwrap();
    let id = saved.id.unwrap();
    let found = BookRepository::find_by_id(store, id).await.unwrap().unwrap();

    assert_eq!(found, saved);
    book.id = Some(id);
    assert_eq!(found, book);
}

pub async fn book_upsert_keeps_identity<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut saved = BookRepository::save(store, &Book::with_title("Draft"))
        .await
        .unwrap();
    saved.title = "Final".to_string();
    let resaved = BookRepository::save(store, &saved).await.unwrap();

    assert_eq!(resaved.id, saved.id);
    let all = BookRepository::find_all(store).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Final");
}

pub async fn uncategorized_books<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut category = saved_category(store, "Fiction").await;
    category.add_book(Book::with_title("Dune")).unwrap();
    BookRepository::save(store, &category.books()[0]).await.unwrap();
    BookRepository::save(store, &Book::with_title("Emma")).await.unwrap();
    BookRepository::save(store, &Book::with_title("Ulysses")).await.unwrap();

    let uncategorized = BookRepository::find_by_category_is_null(store).await.unwrap();
    let titles: Vec<_> = uncategorized.iter().map(|book| book.title.as_str()).collect();
    assert_eq!(titles, ["Emma", "Ulysses"]);
    assert_eq!(BookRepository::find_all(store).await.unwrap().len(), 3);
}

pub async fn unknown_category_is_rejected<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut book = Book::with_title("Orphan");
    book.set_category(Some(CategoryRef::persisted(999, None)));

    let err = BookRepository::save(store, &book).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UnknownCategory(999)));
    assert!(BookRepository::find_all(store).await.unwrap().is_empty());
}

pub async fn category_loads_its_books<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut category = saved_category(store, "Science").await;
    category.add_book(Book::with_title("Cosmos")).unwrap();
    category.add_book(Book::with_title("Origin")).unwrap();
    for book in category.books() {
        BookRepository::save(store, book).await.unwrap();
    }
    let id = category.id().unwrap();

    let loaded = CategoryRepository::find_by_id(store, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name(), "Science");
    assert_eq!(loaded.books().len(), 2);
    assert!(loaded.books().iter().all(|book| book.category_is(&loaded)));
    assert_eq!(CategoryRepository::count_books(store, id).await.unwrap(), 2);

    let book = &BookRepository::find_all(store).await.unwrap()[0];
    let reference = book.category().unwrap();
    assert_eq!(reference.id, Some(id));
    assert_eq!(reference.name.as_deref(), Some("Science"));
}

pub async fn category_in_use_cannot_be_deleted<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    let mut category = saved_category(store, "History").await;
    let id = category.id().unwrap();
    category.add_book(Book::with_title("SPQR")).unwrap();
    let book = BookRepository::save(store, &category.books()[0])
        .await
        .unwrap();

    let err = CategoryRepository::delete_by_id(store, id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::CategoryInUse(found) if found == id));
    assert!(CategoryRepository::find_by_id(store, id)
        .await
        .unwrap()
        .is_some());

    BookRepository::delete_by_id(store, book.id.unwrap())
        .await
        .unwrap();
    assert_eq!(CategoryRepository::count_books(store, id).await.unwrap(), 0);
    CategoryRepository::delete_by_id(store, id).await.unwrap();
    assert!(CategoryRepository::find_by_id(store, id)
        .await
        .unwrap()
        .is_none());
}

pub async fn deleting_missing_rows_is_a_no_op<S>(store: &S)
where
    S: BookRepository + CategoryRepository,
{
    BookRepository::delete_by_id(store, 404).await.unwrap();
    CategoryRepository::delete_by_id(store, 404).await.unwrap();
}
