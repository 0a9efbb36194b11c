//! Categories: genres that books are filed under.

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

const TAG: &str = "Categories";

pub struct CategoriesModule {
    state: AppState,
}

impl CategoriesModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
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
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Category id");

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List categories", TAG, vec![], None, (200, Some(array_of("Category"))), &[500]),
                    "post": operation(
                        "Create category",
                        TAG,
                        vec![],
                        Some(json_body("Category")),
                        (201, Some(schema_ref("Category"))),
                        &[400, 422, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get category", TAG, vec![id()], None, (200, Some(schema_ref("Category"))), &[404]),
                    "put": operation(
                        "Replace category",
                        TAG,
                        vec![id()],
                        Some(json_body("Category")),
                        (204, None),
                        &[400, 404, 422, 500],
                    ),
                    "delete": operation("Delete category", TAG, vec![id()], None, (204, None), &[404, 409, 500])
                },
                "/{id}/books": {
                    "get": operation("Books in a category", TAG, vec![id()], None, (200, Some(array_of("Book"))), &[404])
                },
                "/books/{id}": {
                    "get": operation(
                        "Categories of a book",
                        TAG,
                        vec![id_param("Book id")],
                        None,
                        (200, Some(array_of("Category"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Category": {
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
                CREATE TABLE IF NOT EXISTS categories (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_categories_name ON categories (name);
            "#,
        }]
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(CategoriesModule::new(state))
}
