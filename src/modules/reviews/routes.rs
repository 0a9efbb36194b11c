//! HTTP handlers for `/api/reviews`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};

use super::models::{Review, ReviewDto, ReviewPayload};
use crate::modules::books::models::BookDto;
use crate::state::AppState;
use crate::utils;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/health", get(health_check))
        .route("/{id}", get(get_review).put(update_review).delete(delete_review))
        .route("/{id}/book", get(book_of_review))
        .route("/books/{id}", get(reviews_of_book))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "reviews module is healthy"
}

async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let reviews = state.reviews.list().await?;
    Ok(Json(reviews.iter().map(ReviewDto::from).collect()))
}

async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReviewDto>, AppError> {
    let review = find_review(&state, id).await?;
    Ok(Json(ReviewDto::from(&review)))
}

async fn book_of_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, AppError> {
    if !state.reviews.exists(id).await? {
        return Err(AppError::not_found(format!("Review {id} not found")));
    }

    let book = state
        .reviews
        .book_of_review(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book of review {id} not found")))?;
    Ok(Json(BookDto::from(&book)))
}

async fn reviews_of_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    if !state.books.exists(book_id).await? {
        return Err(AppError::not_found(format!("Book {book_id} not found")));
    }

    let reviews = state.reviews.reviews_of_book(book_id).await?;
    Ok(Json(reviews.iter().map(ReviewDto::from).collect()))
}

async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let review = Review::from(utils::payload(payload)?);

    ensure_owners_exist(&state, &review).await?;

    let created = state.reviews.create(&review).await?;
    tracing::info!(
        review_id = created.id,
        book_id = created.book_id,
        reviewer_id = created.reviewer_id,
        "review created"
    );

    Ok(utils::created("reviews", created.id, ReviewDto::from(&created)))
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ReviewPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let review = Review::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, review.id, "Review")?;

    if !state.reviews.exists(id).await? {
        return Err(AppError::not_found(format!("Review {id} not found")));
    }
    ensure_owners_exist(&state, &review).await?;

    state.reviews.update(&review).await?;
    tracing::info!(review_id = id, "review updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let review = find_review(&state, id).await?;

    state.reviews.delete(&review).await?;
    tracing::info!(review_id = id, "review deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_review(state: &AppState, id: i64) -> Result<Review, AppError> {
    state
        .reviews
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Review {id} not found")))
}

async fn ensure_owners_exist(state: &AppState, review: &Review) -> Result<(), AppError> {
    if !state.reviewers.exists(review.reviewer_id).await? {
        return Err(AppError::not_found(format!(
            "Reviewer {} not found",
            review.reviewer_id
        )));
    }
    if !state.books.exists(review.book_id).await? {
        return Err(AppError::not_found(format!("Book {} not found", review.book_id)));
    }
    Ok(())
}
