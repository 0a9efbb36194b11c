//! Request helpers shared by the resource modules.

pub mod openapi;
pub mod validation;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use catalog_http::AppError;
use serde::Serialize;
use validator::Validate;

pub use validation::{invalid_payload, not_blank};

/// Unwrap a JSON body and run its `validator` checks.
///
/// Missing, empty, `null` and malformed bodies all become 400 rather than the
/// extractor's default 415/422 so that 422 stays reserved for duplicates.
pub fn payload<T: Validate>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    let Json(value) = body?;
    value.validate().map_err(invalid_payload)?;
    Ok(value)
}

/// Reject updates whose body id disagrees with the path id.
pub fn ensure_matching_ids(path_id: i64, body_id: i64, entity: &str) -> Result<(), AppError> {
    if path_id != body_id {
        return Err(AppError::bad_request(format!(
            "{entity} id {body_id} in body does not match id {path_id} in path"
        )));
    }
    Ok(())
}

/// 201 response pointing back at the get-by-id route of the created entity.
pub fn created<T: Serialize>(module: &str, id: i64, body: T) -> Response {
    let location = format!("/api/{module}/{id}");
    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(body),
    )
        .into_response()
}
