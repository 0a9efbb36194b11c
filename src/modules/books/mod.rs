//! Books: ISBN-identified titles linked to authors and categories.

pub mod models;
pub mod repository;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use catalog_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::state::AppState;
use crate::utils::openapi::{
    array_of, id_param, json_body, operation, repeated_id_query, schema_ref,
};

const TAG: &str = "Books";

pub struct BooksModule {
    state: AppState,
}

impl BooksModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let id = || id_param("Book id");
        let links = || {
            vec![
                repeated_id_query("authId", "Author ids, at least one"),
                repeated_id_query("catId", "Category ids, at least one"),
            ]
        };
        let mut with_id_and_links = links();
        with_id_and_links.insert(0, id());

        Some(json!({
            "paths": {
                "/": {
                    "get": operation("List books", TAG, vec![], None, (200, Some(array_of("Book"))), &[500]),
                    "post": operation(
                        "Create book",
                        TAG,
                        links(),
                        Some(json_body("BookPayload")),
                        (201, Some(schema_ref("Book"))),
                        &[400, 404, 422, 500],
                    )
                },
                "/{id}": {
                    "get": operation("Get book", TAG, vec![id()], None, (200, Some(schema_ref("Book"))), &[404]),
                    "put": operation(
                        "Replace book and its author and category links",
                        TAG,
                        with_id_and_links,
                        Some(json_body("BookPayload")),
                        (204, None),
                        &[400, 404, 422, 500],
                    ),
                    "delete": operation(
                        "Delete book and its reviews",
                        TAG,
                        vec![id()],
                        None,
                        (204, None),
                        &[404, 500],
                    )
                },
                "/{id}/rating": {
                    "get": operation(
                        "Mean review rating, 0 without reviews",
                        TAG,
                        vec![id()],
                        None,
                        (200, Some(json!({ "type": "number", "format": "double" }))),
                        &[404],
                    )
                },
                "/isbn/{isbn}": {
                    "get": operation(
                        "Get book by ISBN",
                        TAG,
                        vec![json!({
                            "name": "isbn",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        })],
                        None,
                        (200, Some(schema_ref("Book"))),
                        &[404],
                    )
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "isbn": { "type": "string" },
                            "title": { "type": "string" },
                            "datePublished": { "type": ["string", "null"], "format": "date-time" }
                        },
                        "required": ["id", "isbn", "title"]
                    },
                    "BookPayload": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "isbn": { "type": "string", "minLength": 3, "maxLength": 10 },
                            "title": { "type": "string", "maxLength": 200 },
                            "datePublished": { "type": ["string", "null"], "format": "date-time" }
                        },
                        "required": ["isbn", "title"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    isbn           TEXT NOT NULL,
                    title          TEXT NOT NULL,
                    date_published TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_books_isbn ON books (isbn);
                CREATE INDEX IF NOT EXISTS idx_books_title ON books (title);

                CREATE TABLE IF NOT EXISTS book_authors (
                    book_id   INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    author_id INTEGER NOT NULL REFERENCES authors (id),
                    PRIMARY KEY (book_id, author_id)
                );
                CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors (author_id);

                CREATE TABLE IF NOT EXISTS book_categories (
                    book_id     INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories (id),
                    PRIMARY KEY (book_id, category_id)
                );
                CREATE INDEX IF NOT EXISTS idx_book_categories_category ON book_categories (category_id);
            "#,
        }]
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(state))
}
