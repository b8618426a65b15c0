//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    /// Resource missing
    NotFound(String),

    /// Anything else
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        let body = Json(json!({
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
