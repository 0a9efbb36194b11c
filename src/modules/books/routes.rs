//! HTTP handlers for `/api/books`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};
use serde_json::json;

use super::models::{Book, BookDto, BookPayload};
use crate::state::AppState;
use crate::utils;

/// Query key carrying author ids on create and update.
const AUTHOR_ID_KEY: &str = "authId";
/// Query key carrying category ids on create and update.
const CATEGORY_ID_KEY: &str = "catId";

type Pairs = Vec<(String, String)>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .route("/{id}/rating", get(book_rating))
        .route("/isbn/{isbn}", get(get_book_by_isbn))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookDto>>, AppError> {
    let books = state.books.list().await?;
    Ok(Json(books.iter().map(BookDto::from).collect()))
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookDto>, AppError> {
    let book = find_book(&state, id).await?;
    Ok(Json(BookDto::from(&book)))
}

async fn get_book_by_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookDto>, AppError> {
    let book = state
        .books
        .get_by_isbn(&isbn)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book with ISBN {isbn} not found")))?;
    Ok(Json(BookDto::from(&book)))
}

async fn book_rating(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<f64>, AppError> {
    if !state.books.exists(id).await? {
        return Err(AppError::not_found(format!("Book {id} not found")));
    }

    Ok(Json(state.books.rating(id).await?))
}

async fn create_book(
    State(state): State<AppState>,
    query: Result<Query<Pairs>, QueryRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let book = Book::from(utils::payload(payload)?);
    let Query(pairs) = query?;
    let (author_ids, category_ids) = linked_ids(&pairs)?;

    ensure_links_exist(&state, &author_ids, &category_ids).await?;
    ensure_unique_isbn(&state, 0, &book.isbn).await?;
    ensure_links_present(&author_ids, &category_ids)?;

    let created = state.books.create(&book, &author_ids, &category_ids).await?;
    tracing::info!(
        book_id = created.id,
        isbn = %created.isbn,
        authors = author_ids.len(),
        categories = category_ids.len(),
        "book created"
    );

    Ok(utils::created("books", created.id, BookDto::from(&created)))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    query: Result<Query<Pairs>, QueryRejection>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let book = Book::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, book.id, "Book")?;
    let Query(pairs) = query?;
    let (author_ids, category_ids) = linked_ids(&pairs)?;

    if !state.books.exists(id).await? {
        return Err(AppError::not_found(format!("Book {id} not found")));
    }
    ensure_links_exist(&state, &author_ids, &category_ids).await?;
    ensure_unique_isbn(&state, id, &book.isbn).await?;
    ensure_links_present(&author_ids, &category_ids)?;

    state.books.update(&book, &author_ids, &category_ids).await?;
    tracing::info!(book_id = id, "book updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let book = find_book(&state, id).await?;

    let reviews = state.reviews.reviews_of_book(id).await?;
    if !reviews.is_empty() {
        state.reviews.delete_many(&reviews).await?;
    }
    state.books.delete(&book).await?;
    tracing::info!(book_id = id, reviews = reviews.len(), "book deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_book(state: &AppState, id: i64) -> Result<Book, AppError> {
    state
        .books
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Book {id} not found")))
}

/// Collect repeated `authId`/`catId` values in the order given.
fn linked_ids(pairs: &[(String, String)]) -> Result<(Vec<i64>, Vec<i64>), AppError> {
    let mut author_ids = Vec::new();
    let mut category_ids = Vec::new();

    for (key, value) in pairs {
        let target = match key.as_str() {
            AUTHOR_ID_KEY => &mut author_ids,
            CATEGORY_ID_KEY => &mut category_ids,
            _ => continue,
        };
        let id = value.trim().parse::<i64>().map_err(|_| {
            AppError::invalid_fields(
                vec![json!({ "field": key, "error": "must be an integer" })],
                format!("{key} value {value:?} is not a valid id"),
            )
        })?;
        target.push(id);
    }

    Ok((author_ids, category_ids))
}

async fn ensure_links_exist(
    state: &AppState,
    author_ids: &[i64],
    category_ids: &[i64],
) -> Result<(), AppError> {
    for &author_id in author_ids {
        if !state.authors.exists(author_id).await? {
            return Err(AppError::not_found(format!("Author {author_id} not found")));
        }
    }
    for &category_id in category_ids {
        if !state.categories.exists(category_id).await? {
            return Err(AppError::not_found(format!("Category {category_id} not found")));
        }
    }
    Ok(())
}

async fn ensure_unique_isbn(state: &AppState, id: i64, isbn: &str) -> Result<(), AppError> {
    if state.books.is_duplicate_isbn(id, isbn).await? {
        return Err(AppError::validation(
            vec![json!({ "field": "isbn", "error": "duplicate" })],
            format!("Book with ISBN {} already exists", isbn.trim()),
        ));
    }
    Ok(())
}

fn ensure_links_present(author_ids: &[i64], category_ids: &[i64]) -> Result<(), AppError> {
    let mut missing = Vec::new();
    if author_ids.is_empty() {
        missing.push(json!({ "field": AUTHOR_ID_KEY, "error": "at least one id required" }));
    }
    if category_ids.is_empty() {
        missing.push(json!({ "field": CATEGORY_ID_KEY, "error": "at least one id required" }));
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_fields(
            missing,
            "a book needs at least one author and one category",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::{self, TestApp};

    #[test]
    fn linked_ids_keeps_repeats_and_ignores_other_keys() {
        let pairs = vec![
            ("authId".to_string(), "1".to_string()),
            ("page".to_string(), "x".to_string()),
            ("catId".to_string(), "2".to_string()),
            ("authId".to_string(), "3".to_string()),
        ];
        assert_eq!(linked_ids(&pairs).unwrap(), (vec![1, 3], vec![2]));

        let bad = vec![("catId".to_string(), "two".to_string())];
        assert_eq!(linked_ids(&bad).unwrap_err().status(), StatusCode::BAD_REQUEST);
    }

    async fn seeded() -> (TestApp, i64, i64) {
        let app = TestApp::new().await;
        let country = testing::country(&app.state, "France").await;
        let author = testing::author(&app.state, "Jules", "Verne", country.id).await;
        let category = testing::category(&app.state, "Adventure").await;
        (app, author.id, category.id)
    }

    #[tokio::test]
    async fn create_is_retrievable_by_id_and_isbn() {
        let (app, author_id, category_id) = seeded().await;

        let response = app
            .post_response(
                &format!("/api/books?authId={author_id}&catId={category_id}"),
                json!({ "isbn": "1234567", "title": "Foo" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()["location"].to_str().unwrap().to_string();

        let (status, body) = app.get(&location).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Foo");
        assert_eq!(body["datePublished"], serde_json::Value::Null);

        let (status, by_isbn) = app.get("/api/books/isbn/1234567").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_isbn, body);
    }

    #[tokio::test]
    async fn create_checks_links_then_isbn_then_emptiness() {
        let (app, author_id, category_id) = seeded().await;
        testing::book(&app.state, "1234567", "Foo", &[author_id], &[category_id]).await;

        let (status, _) = app
            .post(&format!("/api/books?authId=99&catId={category_id}"), json!({ "isbn": "1234567", "title": "Bar" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .post(&format!("/api/books?authId={author_id}&catId={category_id}"), json!({ "isbn": "1234567", "title": "Bar" }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = app
            .post(&format!("/api/books?authId={author_id}"), json!({ "isbn": "7654321", "title": "Bar" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "catId");
    }

    #[tokio::test]
    async fn update_with_mismatched_ids_is_a_bad_request() {
        let (app, author_id, category_id) = seeded().await;

        let status = app
            .put(
                &format!("/api/books/5?authId={author_id}&catId={category_id}"),
                json!({ "id": 7, "isbn": "1234567", "title": "Foo" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let status = app
            .put(
                &format!("/api/books/5?authId={author_id}&catId={category_id}"),
                json!({ "id": 5, "isbn": "1234567", "title": "Foo" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_isbn() {
        let (app, author_id, category_id) = seeded().await;
        let book = testing::book(&app.state, "1234567", "Foo", &[author_id], &[category_id]).await;

        let status = app
            .put(
                &format!("/api/books/{}?authId={author_id}&catId={category_id}", book.id),
                json!({ "id": book.id, "isbn": "1234567", "title": "Foo, revised" }),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = app.get(&format!("/api/books/{}", book.id)).await;
        assert_eq!(body["title"], "Foo, revised");
    }

    #[tokio::test]
    async fn delete_cascades_reviews() {
        let (app, author_id, category_id) = seeded().await;
        let book = testing::book(&app.state, "1234567", "Foo", &[author_id], &[category_id]).await;
        let reviewer = testing::reviewer(&app.state, "Ada", "Lovelace").await;
        let review = testing::review(&app.state, "Great", 5, book.id, reviewer.id).await;

        assert_eq!(
            app.delete(&format!("/api/books/{}", book.id)).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(app.get(&format!("/api/reviews/{}", review.id)).await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get(&format!("/api/books/{}", book.id)).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rating_route() {
        let (app, author_id, category_id) = seeded().await;
        let book = testing::book(&app.state, "1234567", "Foo", &[author_id], &[category_id]).await;
        let reviewer = testing::reviewer(&app.state, "Ada", "Lovelace").await;

        let (status, body) = app.get(&format!("/api/books/{}/rating", book.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(0.0));

        testing::review(&app.state, "Good", 2, book.id, reviewer.id).await;
        testing::review(&app.state, "Better", 5, book.id, reviewer.id).await;
        let (_, body) = app.get(&format!("/api/books/{}/rating", book.id)).await;
        assert_eq!(body, json!(3.5));

        assert_eq!(app.get("/api/books/77/rating").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_numeric_id_is_an_error_envelope() {
        let (app, _, _) = seeded().await;

        let (status, body) = app.get("/api/books/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
        assert!(body["error"]["trace_id"].is_string());

        let (status, body) = app.get("/api/books/abc/rating").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }
}
