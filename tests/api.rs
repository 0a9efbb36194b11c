//! End-to-end behaviour of the assembled catalog router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use catalog_db::Database;
use catalog_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Api {
    router: Router,
}

impl Api {
    async fn new() -> Self {
        let db = Database::in_memory().await.unwrap();
        let (_registry, router) = catalog_app::build_app(&db, &Settings::default())
            .await
            .unwrap();
        Self { router }
    }

    async fn call(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn json(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.call(method, uri, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(&self, uri: &str, body: Value) -> i64 {
        let (status, created) = self.json("POST", uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri}: {created}");
        created["id"].as_i64().unwrap()
    }
}

async fn seed_author_and_category(api: &Api) -> (i64, i64) {
    let country = api.create("/api/countries", json!({ "name": "Norway" })).await;
    let author = api
        .create(
            "/api/authors",
            json!({ "firstName": "Knut", "lastName": "Hamsun", "countryId": country }),
        )
        .await;
    let category = api.create("/api/categories", json!({ "name": "Novel" })).await;
    (author, category)
}

#[tokio::test]
async fn created_book_is_linked_to_exactly_the_requested_ids() {
    let api = Api::new().await;
    let (author, category) = seed_author_and_category(&api).await;
    let other_category = api.create("/api/categories", json!({ "name": "Drama" })).await;

    let response = api
        .call(
            "POST",
            &format!("/api/books?authId={author}&catId={category}"),
            Some(json!({ "isbn": "1234567", "title": "Foo" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let book_id: i64 = location.rsplit('/').next().unwrap().parse().unwrap();

    let (status, by_id) = api.json("GET", &location, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, by_isbn) = api.json("GET", "/api/books/isbn/1234567", None).await;
    assert_eq!(by_id, by_isbn);

    let (_, authors) = api.json("GET", &format!("/api/authors/books/{book_id}"), None).await;
    let author_ids: Vec<i64> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(author_ids, vec![author]);

    let (_, categories) = api.json("GET", &format!("/api/categories/books/{book_id}"), None).await;
    assert_eq!(categories, json!([{ "id": category, "name": "Novel" }]));

    let (_, drama_books) = api
        .json("GET", &format!("/api/categories/{other_category}/books"), None)
        .await;
    assert_eq!(drama_books, json!([]));
}

#[tokio::test]
async fn rating_is_zero_then_the_mean() {
    let api = Api::new().await;
    let (author, category) = seed_author_and_category(&api).await;
    let book = api
        .create(
            &format!("/api/books?authId={author}&catId={category}"),
            json!({ "isbn": "8203", "title": "Sult" }),
        )
        .await;
    let reviewer = api
        .create("/api/reviewers", json!({ "firstName": "Ada", "lastName": "Lovelace" }))
        .await;

    let rating_uri = format!("/api/books/{book}/rating");
    assert_eq!(api.json("GET", &rating_uri, None).await.1, json!(0.0));

    for rating in [3, 4, 5] {
        api.create(
            "/api/reviews",
            json!({
                "headline": format!("{rating} stars"),
                "rating": rating,
                "bookId": book,
                "reviewerId": reviewer
            }),
        )
        .await;
    }
    assert_eq!(api.json("GET", &rating_uri, None).await.1, json!(4.0));
}

#[tokio::test]
async fn country_names_are_unique_ignoring_case_and_padding() {
    let api = Api::new().await;
    api.create("/api/countries", json!({ "name": " France " })).await;

    let (status, body) = api
        .json("POST", "/api/countries", Some(json!({ "name": "FRANCE" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "name");
}

#[tokio::test]
async fn country_delete_waits_for_its_authors() {
    let api = Api::new().await;
    let country = api.create("/api/countries", json!({ "name": "Chile" })).await;
    let author = api
        .create(
            "/api/authors",
            json!({ "firstName": "Pablo", "lastName": "Neruda", "countryId": country }),
        )
        .await;

    let country_uri = format!("/api/countries/{country}");
    let (status, body) = api.json("DELETE", &country_uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, _) = api.json("DELETE", &format!("/api/authors/{author}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = api.json("DELETE", &country_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn book_update_with_mismatched_ids_is_rejected_first() {
    let api = Api::new().await;

    // Nothing exists yet, so anything past the id check would be a 404.
    let (status, body) = api
        .json(
            "PUT",
            "/api/books/5?authId=1&catId=2",
            Some(json!({ "id": 7, "isbn": "1234567", "title": "Foo" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn deleting_a_reviewer_removes_their_reviews() {
    let api = Api::new().await;
    let (author, category) = seed_author_and_category(&api).await;
    let book = api
        .create(
            &format!("/api/books?authId={author}&catId={category}"),
            json!({ "isbn": "8205", "title": "Markens grøde" }),
        )
        .await;
    let reviewer = api
        .create("/api/reviewers", json!({ "firstName": "Grace", "lastName": "Hopper" }))
        .await;
    let mut reviews = Vec::new();
    for headline in ["Earthy", "Slow"] {
        reviews.push(
            api.create(
                "/api/reviews",
                json!({ "headline": headline, "rating": 4, "bookId": book, "reviewerId": reviewer }),
            )
            .await,
        );
    }

    let (status, _) = api.json("DELETE", &format!("/api/reviewers/{reviewer}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for review in reviews {
        let (status, _) = api.json("GET", &format!("/api/reviews/{review}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, _) = api.json("GET", &format!("/api/reviewers/{reviewer}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, remaining) = api.json("GET", &format!("/api/reviews/books/{book}"), None).await;
    assert_eq!(remaining, json!([]));
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let api = Api::new().await;

    let response = api.call("GET", "/api/countries", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let response = api.call("GET", "/api/countries/999", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn openapi_document_covers_the_modules() {
    let api = Api::new().await;
    let (status, doc) = api.json("GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(doc["openapi"], "3.1.0");
    assert!(doc["paths"].get("/api/books").is_some());
    assert!(doc["paths"].get("/api/books/isbn/{isbn}").is_some());
    assert!(doc["components"]["schemas"].get("Review").is_some());

    let response = api.call("GET", "/api/books/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn migrate_prepares_a_file_database_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = Settings::default();
    settings.database.url = format!("sqlite://{}", dir.path().join("nested/catalog.db").display());

    assert_eq!(catalog_app::migrate(&settings).await.unwrap(), 6);
    assert_eq!(catalog_app::migrate(&settings).await.unwrap(), 0);
    assert!(dir.path().join("nested/catalog.db").exists());
}
