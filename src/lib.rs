//! Book catalog application: resource modules, their repositories and the
//! glue that turns them into a running HTTP service.

pub mod modules;
pub mod state;
pub mod utils;

use anyhow::Context;
use axum::Router;
use catalog_db::Database;
use catalog_kernel::settings::Settings;
use catalog_kernel::{InitCtx, ModuleRegistry};

use crate::state::AppState;

/// Registry holding every catalog module wired to `db`.
pub fn build_registry(db: &Database) -> anyhow::Result<ModuleRegistry> {
    let state = AppState::sqlite(db);
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &state)?;
    Ok(registry)
}

/// Apply pending module migrations; returns how many ran.
pub async fn migrate_database(db: &Database) -> anyhow::Result<usize> {
    let registry = build_registry(db)?;
    run_migrations(&registry, db).await
}

async fn run_migrations(registry: &ModuleRegistry, db: &Database) -> anyhow::Result<usize> {
    let migrations = registry.collect_migrations();
    let applied = db
        .run_migrations(&migrations)
        .await
        .context("failed to apply migrations")?;
    tracing::info!(applied, total = migrations.len(), "migrations complete");
    Ok(applied)
}

/// Initialise modules, migrate, start modules and assemble the router.
pub async fn build_app(db: &Database, settings: &Settings) -> anyhow::Result<(ModuleRegistry, Router)> {
    let registry = build_registry(db)?;
    let ctx = InitCtx { settings };

    registry.init_modules(&ctx).await?;
    run_migrations(&registry, db).await?;
    registry.start_modules(&ctx).await?;

    let router = catalog_http::build_router(&registry, settings);
    Ok((registry, router))
}

/// Open the configured database and apply pending migrations.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database")?;
    migrate_database(&db).await
}

/// The merged OpenAPI document for every catalog module.
pub async fn openapi_document() -> anyhow::Result<serde_json::Value> {
    let db = Database::in_memory()
        .await
        .context("failed to open scratch database")?;
    let registry = build_registry(&db)?;
    Ok(catalog_http::router::merge_openapi(&registry))
}

/// Run the HTTP service until Ctrl-C.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let db = Database::connect(&settings.database)
        .await
        .context("failed to open database")?;

    let (registry, router) = build_app(&db, settings).await?;
    tracing::info!(
        env = ?settings.environment,
        modules = registry.module_count(),
        "catalog bootstrap complete"
    );

    catalog_http::serve_router(router, settings, shutdown_signal()).await?;

    registry.stop_modules().await?;
    db.pool().close().await;
    tracing::info!("catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
