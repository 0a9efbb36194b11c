use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::utils::not_blank;

/// Stored book row. Author and category links live in join tables.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub date_published: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_published: Option<OffsetDateTime>,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            date_published: book.date_published,
        }
    }
}

/// Request body for creating or replacing a book.
///
/// Author and category ids travel as `authId`/`catId` query parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(min = 3, max = 10, message = "must be between 3 and 10 characters")
    )]
    pub isbn: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "cannot be more than 200 characters")
    )]
    pub title: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_published: Option<OffsetDateTime>,
}

impl From<BookPayload> for Book {
    fn from(payload: BookPayload) -> Self {
        Self {
            id: payload.id,
            isbn: payload.isbn,
            title: payload.title,
            date_published: payload.date_published,
        }
    }
}
