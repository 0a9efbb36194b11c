//! Reviewers: people who write reviews.

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

const TAG: &str = "Reviewers";

pub struct ReviewersModule {
    state: AppState,
}

impl ReviewersModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for ReviewersModule {
    fn name(&self) -> &'static str {
        "reviewers"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviewers module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Reviewer id");

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List reviewers", TAG, vec![], None, (200, Some(array_of("Reviewer"))), &[500]),
                    "post": operation(
                        "Create reviewer",
                        TAG,
                        vec![],
                        Some(json_body("Reviewer")),
                        (201, Some(schema_ref("Reviewer"))),
                        &[400, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get reviewer", TAG, vec![id()], None, (200, Some(schema_ref("Reviewer"))), &[404]),
                    "put": operation(
                        "Replace reviewer",
                        TAG,
                        vec![id()],
                        Some(json_body("Reviewer")),
                        (204, None),
                        &[400, 404, 500],
                    ),
                    "delete": operation(
                        "Delete reviewer and their reviews",
                        TAG,
                        vec![id()],
                        None,
                        (204, None),
                        &[404, 500],
                    )
                },
                "/{id}/reviews": {
                    "get": operation("Reviews by a reviewer", TAG, vec![id()], None, (200, Some(array_of("Review"))), &[404])
                },
                "/{id}/reviewer": {
                    "get": operation(
                        "Reviewer of a review",
                        TAG,
                        vec![id_param("Review id")],
                        None,
                        (200, Some(schema_ref("Reviewer"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Reviewer": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string", "maxLength": 100 },
                            "lastName": { "type": "string", "maxLength": 200 }
                        },
                        "required": ["firstName", "lastName"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS reviewers (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_reviewers_last_name ON reviewers (last_name);
            "#,
        }]
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(ReviewersModule::new(state))
}
