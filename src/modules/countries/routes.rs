//! HTTP handlers for `/api/countries`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use catalog_http::{extract::Path, AppError};
use serde_json::json;

use super::models::{Country, CountryDto, CountryPayload};
use crate::modules::authors::models::AuthorDto;
use crate::state::AppState;
use crate::utils;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_countries).post(create_country))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_country).put(update_country).delete(delete_country),
        )
        .route("/{id}/authors", get(authors_of_country))
        .route("/authors/{id}", get(country_of_author))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "countries module is healthy"
}

async fn list_countries(State(state): State<AppState>) -> Result<Json<Vec<CountryDto>>, AppError> {
    let countries = state.countries.list().await?;
    Ok(Json(countries.iter().map(CountryDto::from).collect()))
}

async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CountryDto>, AppError> {
    let country = find_country(&state, id).await?;
    Ok(Json(CountryDto::from(&country)))
}

async fn authors_of_country(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    if !state.countries.exists(id).await? {
        return Err(AppError::not_found(format!("Country {id} not found")));
    }

    let authors = state.countries.authors_of(id).await?;
    Ok(Json(authors.iter().map(AuthorDto::from).collect()))
}

async fn country_of_author(
    State(state): State<AppState>,
    Path(author_id): Path<i64>,
) -> Result<Json<CountryDto>, AppError> {
    if !state.authors.exists(author_id).await? {
        return Err(AppError::not_found(format!("Author {author_id} not found")));
    }

    let country = state
        .countries
        .country_of_author(author_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Country of author {author_id} not found")))?;
    Ok(Json(CountryDto::from(&country)))
}

async fn create_country(
    State(state): State<AppState>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let country = Country::from(utils::payload(payload)?);

    ensure_unique_name(&state, 0, &country.name).await?;

    let created = state.countries.create(&country).await?;
    tracing::info!(country_id = created.id, name = %created.name, "country created");

    Ok(utils::created("countries", created.id, CountryDto::from(&created)))
}

async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let country = Country::from(utils::payload(payload)?);
    utils::ensure_matching_ids(id, country.id, "Country")?;

    if !state.countries.exists(id).await? {
        return Err(AppError::not_found(format!("Country {id} not found")));
    }
    ensure_unique_name(&state, id, &country.name).await?;

    state.countries.update(&country).await?;
    tracing::info!(country_id = id, "country updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let country = find_country(&state, id).await?;

    let authors = state.countries.authors_of(id).await?;
    if !authors.is_empty() {
        tracing::warn!(country_id = id, authors = authors.len(), "country delete blocked");
        return Err(AppError::conflict(
            vec![json!({ "authors": authors.len() })],
            format!(
                "Country {} cannot be deleted because it is used by at least 1 author",
                country.name
            ),
        ));
    }

    state.countries.delete(&country).await?;
    tracing::info!(country_id = id, "country deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_country(state: &AppState, id: i64) -> Result<Country, AppError> {
    state
        .countries
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Country {id} not found")))
}

async fn ensure_unique_name(state: &AppState, id: i64, name: &str) -> Result<(), AppError> {
    if state.countries.is_duplicate_name(id, name).await? {
        return Err(AppError::validation(
            vec![json!({ "field": "name", "error": "duplicate" })],
            format!("Country {} already exists", name.trim()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::modules::testing::{self, TestApp};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn duplicate_name_is_unprocessable() {
        let app = TestApp::new().await;

        let (status, _) = app.post("/api/countries", json!({ "name": " France " })).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.post("/api/countries", json!({ "name": "FRANCE" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn update_may_keep_its_own_name() {
        let app = TestApp::new().await;
        let country = testing::country(&app.state, "France").await;

        let status = app
            .put(
                &format!("/api/countries/{}", country.id),
                json!({ "id": country.id, "name": "france" }),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn update_to_another_countrys_name_is_unprocessable() {
        let app = TestApp::new().await;
        testing::country(&app.state, "France").await;
        let spain = testing::country(&app.state, "Spain").await;

        let status = app
            .put(
                &format!("/api/countries/{}", spain.id),
                json!({ "id": spain.id, "name": "France" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_is_blocked_while_authors_reference_it() {
        let app = TestApp::new().await;
        let france = testing::country(&app.state, "France").await;
        let hugo = testing::author(&app.state, "Victor", "Hugo", france.id).await;
        let uri = format!("/api/countries/{}", france.id);

        assert_eq!(app.delete(&uri).await, StatusCode::CONFLICT);

        assert_eq!(
            app.delete(&format!("/api/authors/{}", hugo.id)).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(app.delete(&uri).await, StatusCode::NO_CONTENT);
        assert_eq!(app.get(&uri).await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn relationship_routes_check_the_path_entity() {
        let app = TestApp::new().await;
        let france = testing::country(&app.state, "France").await;
        let hugo = testing::author(&app.state, "Victor", "Hugo", france.id).await;

        let (status, body) = app.get(&format!("/api/countries/{}/authors", france.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([{ "id": hugo.id, "firstName": "Victor", "lastName": "Hugo" }]));

        let (status, body) = app.get(&format!("/api/countries/authors/{}", hugo.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "France");

        assert_eq!(app.get("/api/countries/42/authors").await.0, StatusCode::NOT_FOUND);
        assert_eq!(app.get("/api/countries/authors/42").await.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_or_invalid_body_is_a_bad_request() {
        let app = TestApp::new().await;

        assert_eq!(app.post_raw("/api/countries", "").await, StatusCode::BAD_REQUEST);
        assert_eq!(app.post_raw("/api/countries", "null").await, StatusCode::BAD_REQUEST);

        let long_name = "x".repeat(51);
        let (status, body) = app.post("/api/countries", json!({ "name": long_name })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"][0]["field"], "name");

        let (status, body) = app.post("/api/countries", json!({ "name": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["details"],
            json!([{ "field": "name", "error": "is required" }])
        );
    }
}
