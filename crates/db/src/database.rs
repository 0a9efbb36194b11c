//! SQLite database connection pool and migration runner.

use std::str::FromStr;

use catalog_kernel::settings::DatabaseSettings;
use catalog_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::StoreError;

const MIGRATIONS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS _catalog_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (module, id)
);";

/// Holds a connection pool to the SQLite database.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database described by `settings`.
    ///
    /// Migrations are not applied here; call [`Database::run_migrations`] with
    /// the migrations collected from the module registry.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        if let Some(path) = file_path(&settings.url) {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&settings.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::info!(url = %settings.url, "database pool opened");
        Ok(Self { pool })
    }

    /// Create an in-memory database.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Apply module migrations that have not been applied yet.
    ///
    /// Each migration runs in its own transaction together with its bookkeeping
    /// row, so a failed migration leaves no partial record behind. Returns the
    /// number of migrations applied by this call.
    pub async fn run_migrations(
        &self,
        migrations: &[(String, Migration)],
    ) -> Result<usize, StoreError> {
        sqlx::raw_sql(MIGRATIONS_TABLE_SQL)
            .execute(&self.pool)
            .await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let already: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM _catalog_migrations WHERE module = ? AND id = ?)",
            )
            .bind(module)
            .bind(migration.id)
            .fetch_one(&self.pool)
            .await?;

            if already {
                tracing::debug!(module = %module, migration = migration.id, "migration already applied");
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Migration {
                    module: module.clone(),
                    id: migration.id.to_string(),
                    reason: e.to_string(),
                })?;
            sqlx::query("INSERT INTO _catalog_migrations (module, id) VALUES (?, ?)")
                .bind(module)
                .bind(migration.id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(module = %module, migration = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Extract the filesystem path from a `sqlite:` URL, if it names a file.
fn file_path(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}
