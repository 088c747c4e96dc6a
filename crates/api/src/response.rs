//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use powerlink_common::{AppError, AppResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Success envelope: `{"success": true, ...fields}`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    /// A `200 OK` response.
    #[must_use]
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// A `201 Created` response.
    #[must_use]
    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    fn with_status(status: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self { status, body }
    }

    /// Attach a human readable message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body
            .insert("message".to_string(), Value::String(message.into()));
        self
    }

    /// Attach a payload field.
    pub fn with(mut self, key: &str, value: impl Serialize) -> AppResult<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Failed to encode response: {e}")))?;
        self.body.insert(key.to_string(), value);
        Ok(self)
    }

    /// Attach a list together with its length as `count`.
    pub fn with_list<T: Serialize>(self, key: &str, items: &[T]) -> AppResult<Self> {
        let count = items.len();
        self.with(key, items)?.with("count", count)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_fields() {
        let response = ApiResponse::created()
            .message("Created")
            .with("id", "abc")
            .unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["success"], true);
        assert_eq!(response.body["message"], "Created");
        assert_eq!(response.body["id"], "abc");
    }

    #[test]
    fn test_with_list_counts() {
        let response = ApiResponse::ok().with_list("items", &[1, 2, 3]).unwrap();

        assert_eq!(response.body["count"], 3);
        assert_eq!(response.body["items"], serde_json::json!([1, 2, 3]));
    }
}
