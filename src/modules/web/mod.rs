//! HTML interface over the catalogue, merged at the site root.

pub mod forms;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use bookstore_kernel::{InitCtx, Module};

use crate::app::Catalog;
use crate::error::CatalogError;
use crate::modules::books::models::{Book, BookId};
use crate::modules::categories::models::{Category, CategoryId};
use forms::{BookForm, CategoryForm};

/// Failure rendered as an HTML error page.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<CatalogError> for PageError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::InvalidArgument(message) | CatalogError::ConstraintViolation(message) => {
                Self {
                    status: StatusCode::BAD_REQUEST,
                    message,
                }
            }
            CatalogError::NotFound(message) => Self::not_found(message),
            CatalogError::Repository(err) => {
                tracing::error!(error = %err, "page request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "An internal server error occurred".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, Html(views::error_page(self.status, &self.message))).into_response()
    }
}

type PageResult<T> = Result<T, PageError>;

/// Server-rendered book and category pages.
pub struct WebModule {
    catalog: Catalog,
}

impl WebModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for WebModule {
    fn name(&self) -> &'static str {
        "web"
    }

    fn pages(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/books", get(list_books).post(create_book))
            .route("/books/new", get(new_book))
            .route("/books/{id}", post(update_book))
            .route("/books/{id}/edit", get(edit_book))
            .route("/books/{id}/delete", post(delete_book))
            .route("/categories", get(list_categories).post(create_category))
            .route("/categories/new", get(new_category))
            .route("/categories/{id}", post(update_category))
            .route("/categories/{id}/edit", get(edit_category))
            .route("/categories/edit/{id}", get(edit_category))
            .route("/categories/{id}/delete", post(delete_category))
            .with_state(self.catalog.clone())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "web pages mounted at /");
        Ok(())
    }
}

async fn index() -> Html<String> {
    Html(views::index())
}

async fn list_books(State(catalog): State<Catalog>) -> PageResult<Html<String>> {
    let books = catalog.books.list_all().await?;
    Ok(Html(views::book_list(&books)))
}

async fn new_book(State(catalog): State<Catalog>) -> PageResult<Html<String>> {
    let categories = catalog.categories.list_all().await?;
    Ok(Html(views::book_form(None, &categories)))
}

async fn create_book(
    State(catalog): State<Catalog>,
    Form(form): Form<BookForm>,
) -> PageResult<Redirect> {
    let (book, category_id) = form.parse()?;
    let book = assign_category(&catalog, book, category_id).await?;
    catalog.books.save(&book).await?;
    Ok(Redirect::to("/books"))
}

async fn edit_book(
    State(catalog): State<Catalog>,
    Path(id): Path<BookId>,
) -> PageResult<Html<String>> {
    let book = catalog
        .books
        .get_by_id(id)
        .await?
        .ok_or_else(|| PageError::not_found(format!("book {} not found", id)))?;
    let categories = catalog.categories.list_all().await?;
    Ok(Html(views::book_form(Some(&book), &categories)))
}

async fn update_book(
    State(catalog): State<Catalog>,
    Path(id): Path<BookId>,
    Form(form): Form<BookForm>,
) -> PageResult<Redirect> {
    let (changes, category_id) = form.parse()?;
    let changes = assign_category(&catalog, changes, category_id).await?;
    catalog
        .books
        .update(id, changes)
        .await?
        .ok_or_else(|| PageError::not_found(format!("book {} not found", id)))?;
    Ok(Redirect::to("/books"))
}

async fn delete_book(
    State(catalog): State<Catalog>,
    Path(id): Path<BookId>,
) -> PageResult<Redirect> {
    catalog.books.delete(id).await?;
    Ok(Redirect::to("/books"))
}

/// Attach `book` to the selected category through the category itself, so
/// the book carries a reference the category knows about.
async fn assign_category(
    catalog: &Catalog,
    book: Book,
    category_id: Option<CategoryId>,
) -> PageResult<Book> {
    let Some(category_id) = category_id else {
        return Ok(book);
    };
    let mut category = catalog
        .categories
        .get_by_id(category_id)
        .await?
        .ok_or_else(|| {
            CatalogError::InvalidArgument(format!("unknown category {}", category_id))
        })?;
    Ok(category.add_book(book)?.clone())
}

async fn list_categories(State(catalog): State<Catalog>) -> PageResult<Html<String>> {
    let categories = catalog.categories.list_all().await?;
    Ok(Html(views::category_list(&categories, None)))
}

async fn new_category() -> Html<String> {
    Html(views::category_form(None))
}

async fn create_category(
    State(catalog): State<Catalog>,
    Form(form): Form<CategoryForm>,
) -> PageResult<Redirect> {
    let category = Category::new(form.name.trim());
    catalog.categories.save(&category).await?;
    Ok(Redirect::to("/categories"))
}

async fn edit_category(
    State(catalog): State<Catalog>,
    Path(id): Path<CategoryId>,
) -> PageResult<Html<String>> {
    let category = catalog
        .categories
        .get_by_id(id)
        .await?
        .ok_or_else(|| PageError::not_found(format!("category {} not found", id)))?;
    Ok(Html(views::category_form(Some(&category))))
}

async fn update_category(
    State(catalog): State<Catalog>,
    Path(id): Path<CategoryId>,
    Form(form): Form<CategoryForm>,
) -> PageResult<Redirect> {
    catalog
        .categories
        .rename(id, form.name.trim())
        .await?
        .ok_or_else(|| PageError::not_found(format!("category {} not found", id)))?;
    Ok(Redirect::to("/categories"))
}

/// Redirects on success; a category with books re-renders the list with the
/// reason and status 400.
async fn delete_category(
    State(catalog): State<Catalog>,
    Path(id): Path<CategoryId>,
) -> PageResult<Response> {
    match catalog.categories.delete(id).await {
        Ok(()) => Ok(Redirect::to("/categories").into_response()),
        Err(CatalogError::ConstraintViolation(message)) => {
            let categories = catalog.categories.list_all().await?;
            let page = views::category_list(&categories, Some(&message));
            Ok((StatusCode::BAD_REQUEST, Html(page)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// Create the web module over `catalog`
pub fn create_module(catalog: Catalog) -> Arc<dyn Module> {
    Arc::new(WebModule::new(catalog))
}
