use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::RoutingError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Maps every `RoutingError` variant onto the §7 status table. The one
/// deliberate exception - `confirmDeposit`'s not-found outcome never
/// reaching this conversion - is enforced by the webhook handler, which
/// catches that case itself before it ever becomes an `ApiError`.
impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        match err {
            RoutingError::NotFound(msg) => ApiError::NotFound(msg),
            RoutingError::Expired(msg) => ApiError::NotFound(msg),
            RoutingError::InvalidQuote(msg) => ApiError::BadRequest(msg),
            RoutingError::Upstream(msg) => ApiError::Internal(msg),
            RoutingError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}
