//! Reviews: a reviewer's rated opinion of one book.

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

const TAG: &str = "Reviews";

pub struct ReviewsModule {
    state: AppState,
}

impl ReviewsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Review id");

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List reviews", TAG, vec![], None, (200, Some(array_of("Review"))), &[500]),
                    "post": operation(
                        "Create review",
                        TAG,
                        vec![],
                        Some(json_body("ReviewPayload")),
                        (201, Some(schema_ref("Review"))),
                        &[400, 404, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get review", TAG, vec![id()], None, (200, Some(schema_ref("Review"))), &[404]),
                    "put": operation(
                        "Replace review",
                        TAG,
                        vec![id()],
                        Some(json_body("ReviewPayload")),
                        (204, None),
                        &[400, 404, 500],
                    ),
                    "delete": operation("Delete review", TAG, vec![id()], None, (204, None), &[404, 500])
                },
                "/{id}/book": {
                    "get": operation("Book of a review", TAG, vec![id()], None, (200, Some(schema_ref("Book"))), &[404])
                },
                "/books/{id}": {
                    "get": operation(
                        "Reviews of a book",
                        TAG,
                        vec![id_param("Book id")],
                        None,
                        (200, Some(array_of("Review"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "headline": { "type": "string" },
                            "reviewText": { "type": "string" },
                            "rating": { "type": "integer" }
                        },
                        "required": ["id", "headline", "reviewText", "rating"]
                    },
                    "ReviewPayload": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "headline": { "type": "string", "maxLength": 200 },
                            "reviewText": { "type": "string", "maxLength": 2000 },
                            "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                            "bookId": { "type": "integer", "format": "int64" },
                            "reviewerId": { "type": "integer", "format": "int64" }
                        },
                        "required": ["headline", "rating", "bookId", "reviewerId"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS reviews (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    headline    TEXT NOT NULL,
                    review_text TEXT NOT NULL DEFAULT '',
                    rating      INTEGER NOT NULL,
                    book_id     INTEGER NOT NULL REFERENCES books (id),
                    reviewer_id INTEGER NOT NULL REFERENCES reviewers (id)
                );
                CREATE INDEX IF NOT EXISTS idx_reviews_book ON reviews (book_id);
                CREATE INDEX IF NOT EXISTS idx_reviews_reviewer ON reviews (reviewer_id);
            "#,
        }]
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(ReviewsModule::new(state))
}
