pub mod models;
pub mod repository;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::AppError;
use bookstore_kernel::{InitCtx, Migration, Module};

use crate::error::CatalogError;
use models::{Book, BookId};
use service::BookService;

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            title          TEXT    NOT NULL DEFAULT '',
            author         TEXT,
            isbn           TEXT,
            published_date TEXT,
            available      INTEGER NOT NULL DEFAULT 0,
            category_id    INTEGER REFERENCES categories(id)
        );
        CREATE INDEX IF NOT EXISTS books_category_id ON books(category_id);
        "#,
}];

/// JSON API over books, mounted at `/api/books`.
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(service: BookService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/uncategorized", get(list_uncategorized))
            .route(
                "/{id}",
                get(get_book).put(update_book).delete(delete_book),
            )
            .route("/health", get(health_check))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });
        let error_ref = serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let id_param = serde_json::json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": { "application/json": { "schema": { "type": "array", "items": book_ref } } }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created book",
                                "content": { "application/json": { "schema": book_ref } }
                            },
                            "400": {
                                "description": "Unknown category",
                                "content": { "application/json": { "schema": error_ref } }
                            }
                        }
                    }
                },
                "/uncategorized": {
                    "get": {
                        "summary": "List books without a category",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Books whose category is absent",
                                "content": { "application/json": { "schema": { "type": "array", "items": book_ref } } }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": { "application/json": { "schema": book_ref } }
                            },
                            "404": {
                                "description": "No book with this id",
                                "content": { "application/json": { "schema": error_ref } }
                            }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "description": "Every field, including the category, is overwritten; omitted fields are cleared.",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": book_ref } }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated book",
                                "content": { "application/json": { "schema": book_ref } }
                            },
                            "404": {
                                "description": "No book with this id",
                                "content": { "application/json": { "schema": error_ref } }
                            }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": { "204": { "description": "Deleted" } }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": ["integer", "null"], "format": "int64" },
                            "title": { "type": "string" },
                            "author": { "type": ["string", "null"] },
                            "isbn": { "type": ["string", "null"] },
                            "publishedDate": { "type": ["string", "null"], "format": "date" },
                            "available": { "type": "boolean" },
                            "category": {
                                "type": ["object", "null"],
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "name": { "type": ["string", "null"] }
                                }
                            }
                        },
                        "required": ["title"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// List books endpoint
async fn list_books(State(service): State<BookService>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list_all().await?))
}

/// Books without a category
async fn list_uncategorized(
    State(service): State<BookService>,
) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(service.list_uncategorized().await?))
}

/// Get book endpoint
async fn get_book(
    State(service): State<BookService>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, AppError> {
    service
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// Always inserts; an `id` in the payload is ignored.
async fn create_book(
    State(service): State<BookService>,
    Json(mut book): Json<Book>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    book.id = None;
    let saved = service.save(&book).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Full replace; omitted fields are cleared
async fn update_book(
    State(service): State<BookService>,
    Path(id): Path<BookId>,
    Json(changes): Json<Book>,
) -> Result<Json<Book>, AppError> {
    service
        .update(id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| book_not_found(id))
}

/// Delete book endpoint, 204 even when nothing matched
async fn delete_book(
    State(service): State<BookService>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn book_not_found(id: BookId) -> AppError {
    CatalogError::NotFound(format!("book {} not found", id)).into()
}

/// Create the books module over `service`
pub fn create_module(service: BookService) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(service))
}
