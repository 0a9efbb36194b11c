//! HTTP handlers for `/api/authors`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};
use serde_json::json;

use super::models::{Author, AuthorDto, AuthorPayload};
use crate::modules::books::models::BookDto;
use crate::state::AppState;
use crate::utils;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route("/{id}/books", get(books_of_author))
        .route("/books/{id}", get(authors_of_book))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "authors module is healthy"
}

async fn list_authors(State(state): State<AppState>) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let authors = state.authors.list().await?;
    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AuthorDto>, AppError> {
    let author = find_author(&state, id).await?;
    Ok(Json(AuthorDto::from(&author)))
}

async fn books_of_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<BookDto>>, AppError> {
    if !state.authors.exists(id).await? {
        return Err(AppError::not_found(format!("Author {id} not found")));
    }

    let books = state.authors.books_of_author(id).await?;
    Ok(Json(books.iter().map(BookDto::from).collect()))
}

async fn authors_of_book(
    State(state): State<AppState>,
    Path(book_id): Path<i64>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    if !state.books.exists(book_id).await? {
        return Err(AppError::not_found(format!("Book {book_id} not found")));
    }

    let authors = state.authors.authors_of_book(book_id).await?;
    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

async fn create_author(
    State(state): State<AppState>,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let author = Author::from(utils::payload(payload)?);

    ensure_country_exists(&state, author.country_id).await?;

    let created = state.authors.create(&author).await?;
    tracing::info!(author_id = created.id, country_id = created.country_id, "author created");

    Ok(utils::created("authors", created.id, AuthorDto::from(&created)))
}

async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let author = Author::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, author.id, "Author")?;

    if !state.authors.exists(id).await? {
        return Err(AppError::not_found(format!("Author {id} not found")));
    }
    ensure_country_exists(&state, author.country_id).await?;

    state.authors.update(&author).await?;
    tracing::info!(author_id = id, "author updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let author = find_author(&state, id).await?;

    let books = state.authors.books_of_author(id).await?;
    if !books.is_empty() {
        tracing::warn!(author_id = id, books = books.len(), "author delete blocked");
        return Err(AppError::conflict(
            vec![json!({ "books": books.len() })],
            format!(
                "Author {} {} cannot be deleted because they have at least 1 book",
                author.first_name, author.last_name
            ),
        ));
    }

    state.authors.delete(&author).await?;
    tracing::info!(author_id = id, "author deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_author(state: &AppState, id: i64) -> Result<Author, AppError> {
    state
        .authors
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Author {id} not found")))
}

async fn ensure_country_exists(state: &AppState, country_id: i64) -> Result<(), AppError> {
    if !state.countries.exists(country_id).await? {
        return Err(AppError::not_found(format!(
            "Country {country_id} does not exist"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::modules::testing::{self, TestApp};
    use axum::http::{header, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn create_requires_an_existing_country() {
        let app = TestApp::new().await;

        let (status, _) = app
            .post(
                "/api/authors",
                json!({ "firstName": "Jules", "lastName": "Verne", "countryId": 7 }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let france = testing::country(&app.state, "France").await;
        let response = app
            .post_response(
                "/api/authors",
                json!({ "firstName": "Jules", "lastName": "Verne", "countryId": france.id }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

        let (status, body) = app.get(&location).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["lastName"], "Verne");
        assert!(body.get("countryId").is_none());
    }

    #[tokio::test]
    async fn update_checks_ids_then_existence_then_country() {
        let app = TestApp::new().await;
        let france = testing::country(&app.state, "France").await;
        let author = testing::author(&app.state, "Jules", "Verne", france.id).await;
        let uri = format!("/api/authors/{}", author.id);

        let mismatched = json!({ "id": author.id + 1, "firstName": "J", "lastName": "V", "countryId": france.id });
        assert_eq!(app.put(&uri, mismatched).await, StatusCode::BAD_REQUEST);

        let missing = json!({ "id": 99, "firstName": "J", "lastName": "V", "countryId": france.id });
        assert_eq!(app.put("/api/authors/99", missing).await, StatusCode::NOT_FOUND);

        let bad_country = json!({ "id": author.id, "firstName": "J", "lastName": "V", "countryId": 99 });
        assert_eq!(app.put(&uri, bad_country).await, StatusCode::NOT_FOUND);

        let good = json!({ "id": author.id, "firstName": "Jules Gabriel", "lastName": "Verne", "countryId": france.id });
        assert_eq!(app.put(&uri, good).await, StatusCode::NO_CONTENT);
        assert_eq!(app.get(&uri).await.1["firstName"], "Jules Gabriel");
    }

    #[tokio::test]
    async fn delete_is_blocked_while_books_reference_author() {
        let app = TestApp::new().await;
        let france = testing::country(&app.state, "France").await;
        let category = testing::category(&app.state, "Adventure").await;
        let verne = testing::author(&app.state, "Jules", "Verne", france.id).await;
        let book = testing::book(&app.state, "2070417", "Vingt mille lieues", &[verne.id], &[category.id]).await;

        let uri = format!("/api/authors/{}", verne.id);
        assert_eq!(app.delete(&uri).await, StatusCode::CONFLICT);

        assert_eq!(
            app.delete(&format!("/api/books/{}", book.id)).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(app.delete(&uri).await, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn book_relationship_routes() {
        let app = TestApp::new().await;
        let france = testing::country(&app.state, "France").await;
        let category = testing::category(&app.state, "Adventure").await;
        let verne = testing::author(&app.state, "Jules", "Verne", france.id).await;
        let book = testing::book(&app.state, "2070417", "Vingt mille lieues", &[verne.id], &[category.id]).await;

        let (status, body) = app.get(&format!("/api/authors/{}/books", verne.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["isbn"], "2070417");

        let (status, body) = app.get(&format!("/api/authors/books/{}", book.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], verne.id);

        assert_eq!(app.get("/api/authors/books/404").await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get("/api/authors/404/books").await.0, StatusCode::NOT_FOUND);
    }
}
