//! SQLite pool factory and migration runner.

use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use bookstore_kernel::{settings::DatabaseSettings, Migration};

const MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS _bookstore_migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
)";

/// Open a pool against `settings.url`, creating the database file if needed.
///
/// Foreign keys are enforced on every connection.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to `sqlite::memory:` is a separate database, so keep
    // exactly one alive for the lifetime of the pool.
    let in_memory = settings.url.contains(":memory:");
    let max_connections = if in_memory { 1 } else { settings.max_connections };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to '{}'", settings.url))?;

    tracing::info!(target: "bookstore-db", url = %settings.url, max_connections, "database pool ready");
    Ok(pool)
}

/// Apply every migration not yet recorded in `_bookstore_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already_applied: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _bookstore_migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .context("failed to read migrations table")?;

        if already_applied.is_some() {
            tracing::debug!(target: "bookstore-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await.context("failed to open transaction")?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
        sqlx::query("INSERT INTO _bookstore_migrations (module, id) VALUES (?, ?)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await
            .context("failed to record migration")?;
        tx.commit().await.context("failed to commit migration")?;

        tracing::info!(target: "bookstore-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_settings() -> DatabaseSettings {
        DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            ..DatabaseSettings::default()
        }
    }

    fn shelf_migrations() -> Vec<(String, Migration)> {
        vec![(
            "shelves".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE shelf (id INTEGER PRIMARY KEY, label TEXT NOT NULL);
                     CREATE INDEX shelf_label ON shelf(label);",
            },
        )]
    }

    #[tokio::test]
    async fn migrations_are_applied_once() {
        let pool = connect(&memory_settings()).await.unwrap();
        let migrations = shelf_migrations();

        assert_eq!(run_migrations(&pool, &migrations).await.unwrap(), 1);
        assert_eq!(run_migrations(&pool, &migrations).await.unwrap(), 0);

        sqlx::query("INSERT INTO shelf (label) VALUES ('A')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_migration_is_not_recorded() {
        let pool = connect(&memory_settings()).await.unwrap();
        let broken = vec![(
            "shelves".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE;",
            },
        )];

        let err = run_migrations(&pool, &broken).await.unwrap_err();
        assert!(err.to_string().contains("shelves/001_broken"));

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _bookstore_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }
}
