//! HTTP handlers for `/api/categories`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};
use serde_json::json;

use super::models::{Category, CategoryDto, CategoryPayload};
use crate::modules::books::models::BookDto;
use crate::state::AppState;
use crate::utils;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/{id}/books", get(books_of_category))
        .route("/books/{id}", get(categories_of_book))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "categories module is healthy"
}

async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryDto>>, AppError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories.iter().map(CategoryDto::from).collect()))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryDto>, AppError> {
    let category = find_category(&state, id).await?;
    Ok(Json(CategoryDto::from(&category)))
}

async fn books_of_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    if !state.categories.exists(id).await? {
        return Err(AppError::not_found(format!("Category {id} not found")));
    }

    let books = state.categories.books_of_category(id).await?;
    Ok(Json(books.iter().map(BookDto::from).collect()))
}

async fn categories_of_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<CategoryDto>>, AppError> {
    if !state.books.exists(book_id).await? {
        return Err(AppError::not_found(format!("Book {book_id} not found")));
    }

    let categories = state.categories.categories_of_book(book_id).await?;
    Ok(Json(categories.iter().map(CategoryDto::from).collect()))
}

async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let category = Category::from(utils::payload(payload)?);

    ensure_unique_name(&state, 0, &category.name).await?;

    let created = state.categories.create(&category).await?;
    tracing::info!(category_id = created.id, name = %created.name, "category created");

    Ok(utils::created("categories", created.id, CategoryDto::from(&created)))
}

async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let category = Category::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, category.id, "Category")?;

    if !state.categories.exists(id).await? {
        return Err(AppError::not_found(format!("Category {id} not found")));
    }
    ensure_unique_name(&state, id, &category.name).await?;

    state.categories.update(&category).await?;
    tracing::info!(category_id = id, "category updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let category = find_category(&state, id).await?;

    let books = state.categories.books_of_category(id).await?;
    if !books.is_empty() {
        tracing::warn!(category_id = id, books = books.len(), "category delete blocked");
        return Err(AppError::conflict(
            vec![json!({ "books": books.len() })],
            format!(
                "Category {} cannot be deleted because it is used by at least 1 book",
                category.name
            ),
        ));
    }

    state.categories.delete(&category).await?;
    tracing::info!(category_id = id, "category deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_category(state: &AppState, id: i64) -> Result<Category, AppError> {
    state
        .categories
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
}

async fn ensure_unique_name(state: &AppState, id: i64, name: &str) -> Result<(), AppError> {
    if state.categories.is_duplicate_name(id, name).await? {
        return Err(AppError::validation(
            vec![json!({ "field": "name", "error": "duplicate" })],
            format!("Category {} already exists", name.trim()),
        ));
    }
    Ok(())
}
