//! Countries: named places of origin that authors belong to.

pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::state::AppState;
use crate::utils::openapi::{array_of, id_param, json_body, operation, schema_ref};

const TAG: &str = "Countries";

pub struct CountriesModule {
    state: AppState,
}

impl CountriesModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for CountriesModule {
    fn name(&self) -> &'static str {
        "countries"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "countries module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Country id");

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List countries", TAG, vec![], None, (200, Some(array_of("Country"))), &[500]),
                    "post": operation(
                        "Create country",
                        TAG,
                        vec![],
                        Some(json_body("Country")),
                        (201, Some(schema_ref("Country"))),
                        &[400, 422, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get country", TAG, vec![id()], None, (200, Some(schema_ref("Country"))), &[404]),
                    "put": operation(
                        "Replace country",
                        TAG,
                        vec![id()],
                        Some(json_body("Country")),
                        (204, None),
                        &[400, 404, 422, 500],
                    ),
                    "delete": operation("Delete country", TAG, vec![id()], None, (204, None), &[404, 409, 500])
                },
                "/{id}/authors": {
                    "get": operation("Authors from a country", TAG, vec![id()], None, (200, Some(array_of("Author"))), &[404])
                },
                "/authors/{id}": {
                    "get": operation(
                        "Country of an author",
                        TAG,
                        vec![id_param("Author id")],
                        None,
                        (200, Some(schema_ref("Country"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Country": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": 50 }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS countries (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_countries_name ON countries (name);
            "#,
        }]
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(CountriesModule::new(state))
}
