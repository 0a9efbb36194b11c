//! HTTP handlers for `/api/reviewers`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};

use super::models::{Reviewer, ReviewerDto, ReviewerPayload};
use crate::modules::reviews::models::ReviewDto;
use crate::state::AppState;
use crate::utils;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_reviewers).post(create_reviewer))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_reviewer).put(update_reviewer).delete(delete_reviewer),
        )
        .route("/{id}/reviews", get(reviews_of_reviewer))
        // `{id}` here is a review id
        .route("/{id}/reviewer", get(reviewer_of_review))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "reviewers module is healthy"
}

async fn list_reviewers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewerDto>>, AppError> {
    let reviewers = state.reviewers.list().await?;
    Ok(Json(reviewers.iter().map(ReviewerDto::from).collect()))
}

async fn get_reviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReviewerDto>, AppError> {
    let reviewer = find_reviewer(&state, id).await?;
    Ok(Json(ReviewerDto::from(&reviewer)))
}

async fn reviews_of_reviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    if !state.reviewers.exists(id).await? {
        return Err(AppError::not_found(format!("Reviewer {id} not found")));
    }

    let reviews = state.reviewers.reviews_of_reviewer(id).await?;
    Ok(Json(reviews.iter().map(ReviewDto::from).collect()))
}

async fn reviewer_of_review(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> Result<Json<ReviewerDto>, AppError> {
    if !state.reviews.exists(review_id).await? {
        return Err(AppError::not_found(format!("Review {review_id} not found")));
    }

    let reviewer = state
        .reviewers
        .reviewer_of_review(review_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reviewer of review {review_id} not found")))?;
    Ok(Json(ReviewerDto::from(&reviewer)))
}

async fn create_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReviewerPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let reviewer = Reviewer::from(utils::payload(payload)?);

    let created = state.reviewers.create(&reviewer).await?;
    tracing::info!(reviewer_id = created.id, "reviewer created");

    Ok(utils::created("reviewers", created.id, ReviewerDto::from(&created)))
}

async fn update_reviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ReviewerPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let reviewer = Reviewer::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, reviewer.id, "Reviewer")?;

    if !state.reviewers.exists(id).await? {
        return Err(AppError::not_found(format!("Reviewer {id} not found")));
    }

    state.reviewers.update(&reviewer).await?;
    tracing::info!(reviewer_id = id, "reviewer updated");

    Ok(StatusCode::NO_CONTENT)
}

/// Removes every review written by the reviewer, then the reviewer.
async fn delete_reviewer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let reviewer = find_reviewer(&state, id).await?;

    let reviews = state.reviewers.reviews_of_reviewer(id).await?;
    if !reviews.is_empty() {
        state.reviews.delete_many(&reviews).await?;
    }
    state.reviewers.delete(&reviewer).await?;
    tracing::info!(reviewer_id = id, reviews = reviews.len(), "reviewer deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_reviewer(state: &AppState, id: i64) -> Result<Reviewer, AppError> {
    state
        .reviewers
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reviewer {id} not found")))
}
