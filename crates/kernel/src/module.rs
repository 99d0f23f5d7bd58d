use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while the application boots.
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A named SQL script owned by one module. `id` must be unique within it.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A slice of the bookstore: its routes, pages, schema and lifecycle hooks.
///
/// Only `name` is required; every other hook defaults to "contributes nothing".
#[async_trait]
pub trait Module: Sync + Send {
    fn name(&self) -> &'static str;

    /// Runs before any migration is applied.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// JSON endpoints, nested under `/api/{name}`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// HTML pages, merged at the site root.
    fn pages(&self) -> Router {
        Router::new()
    }

    /// OpenAPI document fragment (`paths` and `components.schemas` are merged).
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        Vec::new()
    }

    /// Runs once the schema is current and before the listener opens.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
