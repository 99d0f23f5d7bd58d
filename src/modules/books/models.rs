use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::modules::categories::models::{Category, CategoryRef};
use crate::utils::Handle;

/// Store-assigned book key.
pub type BookId = i64;

/// A book in the catalogue.
///
/// `id` stays `None` until the store assigns a key on first save. The
/// category reference can only be changed from the category side (see
/// [`Category::add_book`]) or by the services inside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(skip)]
    handle: Handle,
    #[serde(default)]
    pub id: Option<BookId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    category: Option<CategoryRef>,
}

impl Book {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            handle: Handle::fresh(),
            id: None,
            title: title.into(),
            author: None,
            isbn: None,
            published_date: None,
            available: false,
            category: None,
        }
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }

    pub fn category(&self) -> Option<&CategoryRef> {
        self.category.as_ref()
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category.as_ref().and_then(|reference| reference.id)
    }

    /// Whether this book's category reference points at `category`.
    pub fn category_is(&self, category: &Category) -> bool {
        self.category
            .as_ref()
            .is_some_and(|reference| reference.refers_to(category))
    }

    pub(crate) fn set_category(&mut self, category: Option<CategoryRef>) {
        self.category = category;
    }
}

/// Field-wise equality; in-memory identity is not compared.
impl PartialEq for Book {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.author == other.author
            && self.isbn == other.isbn
            && self.published_date == other.published_date
            && self.available == other.available
            && self.category_id() == other.category_id()
    }
}

/// Serialized form of a book nested inside its category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary<'a> {
    pub id: Option<BookId>,
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub isbn: Option<&'a str>,
    pub published_date: Option<NaiveDate>,
    pub available: bool,
}

impl<'a> From<&'a Book> for BookSummary<'a> {
    fn from(book: &'a Book) -> Self {
        Self {
            id: book.id,
            title: &book.title,
            author: book.author.as_deref(),
            isbn: book.isbn.as_deref(),
            published_date: book.published_date,
            available: book.available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_title_builds_unpersisted_book() {
        let book = Book::with_title("Clean Code");
        assert_eq!(book.title, "Clean Code");
        assert!(book.id.is_none());
        assert!(book.category().is_none());
        assert!(!book.available);
    }

    #[test]
    fn serializes_camel_case_with_iso_dates() {
        let mut book = Book::with_title("Refactoring");
        book.id = Some(1);
        book.author = Some("Martin Fowler".to_string());
        book.isbn = Some("9780201485677".to_string());
        book.published_date = NaiveDate::from_ymd_opt(1999, 7, 8);
        book.available = true;
        book.set_category(Some(CategoryRef::persisted(2, Some("Craft".to_string()))));

        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["publishedDate"], "1999-07-08");
        assert_eq!(json["available"], true);
        assert_eq!(json["category"]["id"], 2);
        assert_eq!(json["category"]["name"], "Craft");
        assert!(json.get("handle").is_none());
    }

    #[test]
    fn deserializes_partial_payload() {
        let book: Book =
            serde_json::from_str(r#"{"title":"Book In Category","category":{"id":4}}"#).unwrap();
        assert_eq!(book.title, "Book In Category");
        assert_eq!(book.category_id(), Some(4));
        assert!(book.author.is_none());
        assert!(book.published_date.is_none());
    }

    #[test]
    fn equality_ignores_identity() {
        let a = Book::with_title("Dune");
        let b = Book::with_title("Dune");
        assert_eq!(a, b);
        assert_ne!(a.handle(), b.handle());
    }
}
