use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::not_blank;

/// Stored review row with both owning references.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub headline: String,
    pub review_text: String,
    pub rating: i64,
    pub book_id: i64,
    pub reviewer_id: i64,
}

/// Flat transfer representation; book and reviewer are their own routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i64,
    pub headline: String,
    pub review_text: String,
    pub rating: i64,
}

impl From<&Review> for ReviewDto {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id,
            headline: review.headline.clone(),
            review_text: review.review_text.clone(),
            rating: review.rating,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[serde(default)]
    pub id: i64,
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "cannot be more than 200 characters")
    )]
    pub headline: String,
    #[validate(length(max = 2000, message = "cannot be more than 2000 characters"))]
    #[serde(default)]
    pub review_text: String,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i64,
    pub book_id: i64,
    pub reviewer_id: i64,
}

impl From<ReviewPayload> for Review {
    fn from(payload: ReviewPayload) -> Self {
        Self {
            id: payload.id,
            headline: payload.headline,
            review_text: payload.review_text,
            rating: payload.rating,
            book_id: payload.book_id,
            reviewer_id: payload.reviewer_id,
        }
    }
}
