use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

/// Stored author row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub country_id: i64,
}

/// Flat transfer representation of an author; the country is its own route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Author> for AuthorDto {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
        }
    }
}

/// Request body for creating or replacing an author.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    #[serde(default)]
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "cannot be more than 100 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "cannot be more than 200 characters")
    )]
    pub last_name: String,
    pub country_id: i64,
}

impl From<AuthorPayload> for Author {
    fn from(payload: AuthorPayload) -> Self {
        Self {
            id: payload.id,
            first_name: payload.first_name,
            last_name: payload.last_name,
            country_id: payload.country_id,
        }
    }
}
