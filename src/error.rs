// HTTP API error types.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};

use crate::store::StoreError;

/// Request-terminal errors with their HTTP mapping.
///
/// 401 and 403 deliberately carry no body; everything else responds with a
/// small JSON document describing the failure.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MissingBody,
    InvalidBody(Vec<Value>),
    // 401 Unauthorized (no credential presented)
    Unauthenticated,
    // 403 Forbidden (credential present but insufficient tier)
    Forbidden,
    // 404 Not Found
    NoRoute { path: String, method: String },
    NotFound(Value),
    // 500 Internal Server Error
    Internal(String),
}

impl ApiError {
    /// 404 with an explicit response body naming the missing resource.
    pub fn not_found(body: Value) -> Self {
        ApiError::NotFound(body)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingBody | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NoRoute { .. } | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing response body, if this error carries one.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ApiError::MissingBody => Some(json!({ "message": "Missing request body" })),
            ApiError::InvalidBody(errors) => Some(json!({
                "message": "Invalid request body",
                "errors": errors,
            })),
            ApiError::Unauthenticated | ApiError::Forbidden => None,
            ApiError::NoRoute { path, method } => Some(json!({
                "message": "No route found",
                "path": path,
                "method": method,
            })),
            ApiError::NotFound(body) => Some(body.clone()),
            ApiError::Internal(message) => Some(json!({ "message": message })),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_json() {
            Some(body) => write!(f, "{} {}", self.status_code(), body),
            None => write!(f, "{}", self.status_code()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Log the real error but keep the response generic. The in-memory
        // mutation is not rolled back, so memory and disk diverge until the
        // next successful persist.
        tracing::error!("failed to persist app data: {}", err);
        ApiError::Internal("Failed to persist application data".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.to_json() {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}
