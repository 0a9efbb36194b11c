//! Builders for the OpenAPI fragments each module contributes.

use serde_json::{json, Map, Value};

/// `$ref` to a component schema.
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Array of a component schema.
pub fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": schema_ref(name) })
}

/// Integer path parameter named `id`.
pub fn id_param(description: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer", "format": "int64" }
    })
}

/// Repeated integer query parameter, e.g. `authId=1&authId=2`.
pub fn repeated_id_query(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": true,
        "description": description,
        "schema": { "type": "array", "items": { "type": "integer", "format": "int64" } }
    })
}

/// JSON request body referencing a component schema.
pub fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(schema) } }
    })
}

/// One operation object.
///
/// `ok` is the success status and its body schema (`None` for empty bodies);
/// every status in `errors` is documented with the shared error envelope.
pub fn operation(
    summary: &str,
    tag: &str,
    parameters: Vec<Value>,
    request_body: Option<Value>,
    ok: (u16, Option<Value>),
    errors: &[u16],
) -> Value {
    let mut responses = Map::new();
    let (status, schema) = ok;
    let mut success = json!({ "description": describe(status) });
    if let Some(schema) = schema {
        success["content"] = json!({ "application/json": { "schema": schema } });
    }
    responses.insert(status.to_string(), success);

    for code in errors {
        responses.insert(
            code.to_string(),
            json!({
                "description": describe(*code),
                "content": { "application/json": { "schema": schema_ref("ErrorResponse") } }
            }),
        );
    }

    let mut op = json!({
        "summary": summary,
        "tags": [tag],
        "responses": Value::Object(responses)
    });
    if !parameters.is_empty() {
        op["parameters"] = Value::Array(parameters);
    }
    if let Some(body) = request_body {
        op["requestBody"] = body;
    }
    op
}

fn describe(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No content",
        400 => "Missing or malformed payload, or mismatched ids",
        404 => "Referenced entity not found",
        409 => "Blocked by dependent records",
        422 => "Duplicate name or ISBN",
        500 => "Store write failed",
        _ => "Response",
    }
}
