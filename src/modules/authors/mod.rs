//! Authors: people credited on books, each from one country.

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

const TAG: &str = "Authors";

pub struct AuthorsModule {
    state: AppState,
}

impl AuthorsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Author id");

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List authors", TAG, vec![], None, (200, Some(array_of("Author"))), &[500]),
                    "post": operation(
                        "Create author",
                        TAG,
                        vec![],
                        Some(json_body("AuthorPayload")),
                        (201, Some(schema_ref("Author"))),
                        &[400, 404, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get author", TAG, vec![id()], None, (200, Some(schema_ref("Author"))), &[404]),
                    "put": operation(
                        "Replace author",
                        TAG,
                        vec![id()],
                        Some(json_body("AuthorPayload")),
                        (204, None),
                        &[400, 404, 500],
                    ),
                    "delete": operation("Delete author", TAG, vec![id()], None, (204, None), &[404, 409, 500])
                },
                "/{id}/books": {
                    "get": operation("Books by an author", TAG, vec![id()], None, (200, Some(array_of("Book"))), &[404])
                },
                "/books/{id}": {
                    "get": operation(
                        "Authors of a book",
                        TAG,
                        vec![id_param("Book id")],
                        None,
                        (200, Some(array_of("Author"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "AuthorPayload": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string", "maxLength": 100 },
                            "lastName": { "type": "string", "maxLength": 200 },
                            "countryId": { "type": "integer", "format": "int64" }
                        },
                        "required": ["firstName", "lastName", "countryId"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS authors (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL,
                    country_id INTEGER NOT NULL REFERENCES countries (id)
                );
                CREATE INDEX IF NOT EXISTS idx_authors_country ON authors (country_id);
                CREATE INDEX IF NOT EXISTS idx_authors_last_name ON authors (last_name);
            "#,
        }]
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(state))
}
