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
use crate::modules::books::models::Book;
use models::{Category, CategoryId};
use service::CategoryService;

pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_create_categories",
    up: r#"
        CREATE TABLE IF NOT EXISTS categories (
            id   INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT    NOT NULL DEFAULT ''
        );
        "#,
}];

/// JSON API over categories, mounted at `/api/categories`.
pub struct CategoriesModule {
    service: CategoryService,
}

impl CategoriesModule {
    pub fn new(service: CategoryService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for CategoriesModule {
    fn name(&self) -> &'static str {
        "categories"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "categories module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_categories).post(create_category))
            .route(
                "/{id}",
                get(get_category)
                    .put(rename_category)
                    .delete(delete_category),
            )
            .route("/{id}/books", get(list_category_books))
            .route("/health", get(health_check))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let category_ref = serde_json::json!({ "$ref": "#/components/schemas/Category" });
        let error_ref = serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" });
        let id_param = serde_json::json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);
        let not_found = serde_json::json!({
            "description": "No category with this id",
            "content": { "application/json": { "schema": error_ref } }
        });

        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List categories",
                        "tags": ["Categories"],
                        "responses": {
                            "200": {
                                "description": "All categories with their books",
                                "content": { "application/json": { "schema": { "type": "array", "items": category_ref } } }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a category",
                        "tags": ["Categories"],
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": category_ref } }
                        },
                        "responses": {
                            "201": {
                                "description": "Created category",
                                "content": { "application/json": { "schema": category_ref } }
                            }
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a category",
                        "tags": ["Categories"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "The category",
                                "content": { "application/json": { "schema": category_ref } }
                            },
                            "404": not_found
                        }
                    },
                    "put": {
                        "summary": "Rename a category",
                        "tags": ["Categories"],
                        "parameters": id_param,
                        "requestBody": {
                            "required": true,
                            "content": { "application/json": { "schema": category_ref } }
                        },
                        "responses": {
                            "200": {
                                "description": "Renamed category",
                                "content": { "application/json": { "schema": category_ref } }
                            },
                            "404": not_found
                        }
                    },
                    "delete": {
                        "summary": "Delete a category",
                        "tags": ["Categories"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Deleted" },
                            "400": {
                                "description": "Category has associated books, cannot be deleted",
                                "content": { "application/json": { "schema": error_ref } }
                            }
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "List the books of a category",
                        "tags": ["Categories"],
                        "parameters": id_param,
                        "responses": {
                            "200": {
                                "description": "Books assigned to the category",
                                "content": { "application/json": { "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Book" } } } }
                            },
                            "404": not_found
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Categories health check",
                        "tags": ["Categories"],
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
                    "Category": {
                        "type": "object",
                        "properties": {
                            "id": { "type": ["integer", "null"], "format": "int64" },
                            "name": { "type": "string" },
                            "books": {
                                "type": "array",
                                "readOnly": true,
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "id": { "type": "integer", "format": "int64" },
                                        "title": { "type": "string" },
                                        "author": { "type": ["string", "null"] },
                                        "isbn": { "type": ["string", "null"] },
                                        "publishedDate": { "type": ["string", "null"], "format": "date" },
                                        "available": { "type": "boolean" }
                                    }
                                }
                            }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "categories module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "categories module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "categories module is healthy"
}

/// List categories endpoint
async fn list_categories(
    State(service): State<CategoryService>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(service.list_all().await?))
}

/// Get category endpoint, books included
async fn get_category(
    State(service): State<CategoryService>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>, AppError> {
    find_category(&service, id).await.map(Json)
}

/// Always inserts; only the name of the payload is used.
async fn create_category(
    State(service): State<CategoryService>,
    Json(payload): Json<Category>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let saved = service.save(&Category::new(payload.name())).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Rename endpoint
async fn rename_category(
    State(service): State<CategoryService>,
    Path(id): Path<CategoryId>,
    Json(payload): Json<Category>,
) -> Result<Json<Category>, AppError> {
    service
        .rename(id, payload.name())
        .await?
        .map(Json)
        .ok_or_else(|| category_not_found(id))
}

/// Delete category endpoint; refused while books reference it
async fn delete_category(
    State(service): State<CategoryService>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode, AppError> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Books assigned to one category
async fn list_category_books(
    State(service): State<CategoryService>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Book>>, AppError> {
    let category = find_category(&service, id).await?;
    Ok(Json(category.books().to_vec()))
}

async fn find_category(service: &CategoryService, id: CategoryId) -> Result<Category, AppError> {
    service
        .get_by_id(id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

fn category_not_found(id: CategoryId) -> AppError {
    CatalogError::NotFound(format!("category {} not found", id)).into()
}

/// Create the categories module over `service`
pub fn create_module(service: CategoryService) -> Arc<dyn Module> {
    Arc::new(CategoriesModule::new(service))
}
