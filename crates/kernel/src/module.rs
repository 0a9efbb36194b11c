//! The contract each catalog resource (countries, authors, books, ...) implements.

use async_trait::async_trait;
use axum::Router;

/// Borrowed view of the loaded settings handed to lifecycle hooks.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// One SQL DDL script owned by a module.
///
/// `up` may hold several statements. The migration runner records
/// `(module name, id)` once the script succeeds and never runs that pair
/// again, so an id must not be reused for different SQL.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A catalog resource: its tables, its handlers and its slice of the OpenAPI document.
#[async_trait]
pub trait Module: Sync + Send {
    /// Resource name, e.g. `"books"`. Used as the `/api/{name}` segment,
    /// the migration ledger key and the `module` field in logs.
    fn name(&self) -> &'static str;

    /// Runs before any migration. Modules use it to log readiness.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Handlers with paths relative to the resource, nested under `/api/{name}`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Paths (relative, as in [`Module::routes`]) and component schemas for
    /// this resource. Paths are prefixed and merged into one document.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// DDL scripts, applied in order. Later modules may reference tables
    /// created by modules registered before them.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Hook after migrations. No catalog module spawns background work here.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Hook after the server has drained.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl Module for Bare {
        fn name(&self) -> &'static str {
            "bare"
        }
    }

    #[tokio::test]
    async fn defaults_contribute_nothing() {
        let settings = crate::settings::Settings::default();
        let ctx = InitCtx { settings: &settings };
        let module = Bare;

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert!(module.migrations().is_empty());
        assert!(module.openapi().is_none());
    }
}
