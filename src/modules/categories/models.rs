use serde::{Deserialize, Serialize, Serializer};

use crate::error::CatalogError;
use crate::modules::books::models::{Book, BookSummary};
use crate::utils::Handle;

/// Store-assigned category key.
pub type CategoryId = i64;

/// A category grouping books.
///
/// The category owns the books assigned to it, in association order. Books
/// are only ever attached and detached through [`Category::add_book`] and
/// [`Category::remove_book`], which keep each book's category reference in
/// step with the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip)]
    handle: Handle,
    #[serde(default)]
    id: Option<CategoryId>,
    #[serde(default)]
    name: String,
    #[serde(default, skip_deserializing, serialize_with = "serialize_books")]
    books: Vec<Book>,
}

impl Category {
    /// A new, empty, not yet persisted category.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            handle: Handle::fresh(),
            id: None,
            name: name.into(),
            books: Vec::new(),
        }
    }

    /// Rebuild a persisted category and the books the store assigns to it.
    pub(crate) fn restore(id: CategoryId, name: String, books: Vec<Book>) -> Self {
        let mut category = Self {
            handle: Handle::fresh(),
            id: Some(id),
            name,
            books: Vec::with_capacity(books.len()),
        };
        for mut book in books {
            book.set_category(Some(category.reference()));
            category.books.push(book);
        }
        category
    }

    pub fn id(&self) -> Option<CategoryId> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn handle(&self) -> Handle {
        self.handle
    }

    pub fn set_id(&mut self, id: Option<CategoryId>) {
        self.id = id;
        self.refresh_references();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.refresh_references();
    }

    /// Books currently assigned, in association order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn contains(&self, book: &Book) -> bool {
        self.books.iter().any(|owned| owned.handle() == book.handle())
    }

    /// Reference a book holds to point back at this category.
    pub fn reference(&self) -> CategoryRef {
        CategoryRef {
            handle: Some(self.handle),
            id: self.id,
            name: Some(self.name.clone()),
        }
    }

    /// Attach `book` to this category and return the attached book.
    ///
    /// Fails with `InvalidArgument` when no book is given or when the same
    /// book is already in the collection.
    pub fn add_book(&mut self, book: impl Into<Option<Book>>) -> Result<&Book, CatalogError> {
        let Some(mut book) = book.into() else {
            return Err(CatalogError::InvalidArgument(
                "book must not be null".to_string(),
            ));
        };
        if self.contains(&book) {
            return Err(CatalogError::InvalidArgument(
                "book already present in category".to_string(),
            ));
        }
        book.set_category(Some(self.reference()));
        let index = self.books.len();
        self.books.push(book);
        Ok(&self.books[index])
    }

    /// Detach `book` from this category and hand it back with its category
    /// reference cleared.
    ///
    /// Fails with `InvalidArgument` when no book is given or when the book is
    /// not in the collection.
    pub fn remove_book<'a>(
        &mut self,
        book: impl Into<Option<&'a Book>>,
    ) -> Result<Book, CatalogError> {
        let Some(book) = book.into() else {
            return Err(CatalogError::InvalidArgument(
                "book must not be null".to_string(),
            ));
        };
        let Some(position) = self
            .books
            .iter()
            .position(|owned| owned.handle() == book.handle())
        else {
            return Err(CatalogError::InvalidArgument(
                "book not found in category".to_string(),
            ));
        };
        let mut removed = self.books.remove(position);
        removed.set_category(None);
        Ok(removed)
    }

    fn refresh_references(&mut self) {
        let reference = self.reference();
        for book in &mut self.books {
            book.set_category(Some(reference.clone()));
        }
    }
}

/// A book's pointer at its category: the category's key and name, plus its
/// in-memory handle when the reference was produced by a live category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(skip)]
    handle: Option<Handle>,
    #[serde(default)]
    pub id: Option<CategoryId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CategoryRef {
    /// Reference to a stored category, as read back from a gateway.
    pub fn persisted(id: CategoryId, name: Option<String>) -> Self {
        Self {
            handle: None,
            id: Some(id),
            name,
        }
    }

    /// Whether this reference points at `category`: by key once both sides
    /// have one, by in-memory handle otherwise.
    pub fn refers_to(&self, category: &Category) -> bool {
        match (self.id, category.id()) {
            (Some(own), Some(other)) => own == other,
            _ => self.handle == Some(category.handle()),
        }
    }
}

impl PartialEq for CategoryRef {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(own), Some(theirs)) => own == theirs,
            (None, None) => self.handle.is_some() && self.handle == other.handle,
            _ => false,
        }
    }
}

fn serialize_books<S>(books: &[Book], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(books.iter().map(BookSummary::from))
}
