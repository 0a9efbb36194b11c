use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Reviewer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Reviewer> for ReviewerDto {
    fn from(reviewer: &Reviewer) -> Self {
        Self {
            id: reviewer.id,
            first_name: reviewer.first_name.clone(),
            last_name: reviewer.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerPayload {
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
}

impl From<ReviewerPayload> for Reviewer {
    fn from(payload: ReviewerPayload) -> Self {
        Self {
            id: payload.id,
            first_name: payload.first_name,
            last_name: payload.last_name,
        }
    }
}
