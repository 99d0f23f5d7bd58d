//! Application wiring: store selection, module registry, lifecycle.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookstore_kernel::{
    settings::{Settings, StoreBackend},
    InitCtx, ModuleRegistry,
};
use sqlx::SqlitePool;

use crate::modules;
use crate::modules::books::repository::BookRepository;
use crate::modules::books::service::BookService;
use crate::modules::categories::repository::CategoryRepository;
use crate::modules::categories::service::CategoryService;
use crate::store::{MemoryStore, SqliteStore};

/// The two domain services, sharing one store.
#[derive(Clone)]
pub struct Catalog {
    pub books: BookService,
    pub categories: CategoryService,
}

impl Catalog {
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: BookRepository + CategoryRepository + 'static,
    {
        Self {
            books: BookService::new(store.clone()),
            categories: CategoryService::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

/// Registry holding every module over `catalog`
pub fn build_registry(catalog: &Catalog) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, catalog);
    registry
}

/// A catalogue with its modules initialized and its schema migrated.
pub struct Application {
    pub catalog: Catalog,
    pub registry: ModuleRegistry,
    pub migrations_applied: usize,
    pool: Option<SqlitePool>,
}

impl Application {
    pub async fn bootstrap(settings: &Settings) -> anyhow::Result<Self> {
        let (catalog, pool) = match settings.database.backend {
            StoreBackend::Memory => {
                tracing::info!("using in-memory store");
                (Catalog::in_memory(), None)
            }
            StoreBackend::Sqlite => {
                let pool = bookstore_db::connect(&settings.database)
                    .await
                    .context("failed to open the catalogue database")?;
                let store = Arc::new(SqliteStore::new(pool.clone()));
                (Catalog::new(store), Some(pool))
            }
        };

        let registry = build_registry(&catalog);
        let ctx = InitCtx { settings };
        registry.init_modules(&ctx).await?;

        let migrations_applied = match &pool {
            Some(pool) => bookstore_db::run_migrations(pool, &registry.collect_migrations())
                .await
                .context("failed to migrate the catalogue database")?,
            None => 0,
        };
        tracing::info!(
            modules = registry.module_count(),
            migrations_applied,
            "bookstore bootstrap complete"
        );

        Ok(Self {
            catalog,
            registry,
            migrations_applied,
            pool,
        })
    }

    pub fn router(&self, settings: &Settings) -> Router {
        bookstore_http::build_router(&self.registry, settings)
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.registry.stop_modules().await?;
        if let Some(pool) = self.pool {
            pool.close().await;
        }
        Ok(())
    }
}

/// Bootstrap, then serve HTTP until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let app = Application::bootstrap(settings).await?;
    app.registry.start_modules(&InitCtx { settings }).await?;

    let served = bookstore_http::start_server(&app.registry, settings).await;
    app.shutdown().await?;
    served
}

/// Apply pending schema migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    if settings.database.backend == StoreBackend::Memory {
        tracing::warn!("in-memory store selected, nothing to migrate");
    }
    let app = Application::bootstrap(settings).await?;
    let applied = app.migrations_applied;
    app.shutdown().await?;
    Ok(applied)
}
