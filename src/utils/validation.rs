//! Payload checks built on `validator`, reported through the 400 envelope.

use std::borrow::Cow;

use catalog_http::AppError;
use serde_json::json;
use validator::{ValidationError, ValidationErrors};

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some(Cow::Borrowed("is required"));
        return Err(error);
    }
    Ok(())
}

/// One `{field, error}` detail per violation, fields in camelCase and sorted.
pub fn invalid_payload(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let details = fields
        .into_iter()
        .flat_map(|(field, violations)| {
            let field = camel_case(&field);
            violations.iter().map(move |violation| {
                let error = violation
                    .message
                    .clone()
                    .unwrap_or_else(|| violation.code.clone());
                json!({ "field": field, "error": error })
            })
        })
        .collect();

    AppError::invalid_fields(details, "invalid request payload")
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
