//! Response envelope shared by all endpoints.
//!
//! Successful handlers wrap their payload in [`ApiResponse`], which
//! serializes as `{"data": ...}`. Error bodies are produced by
//! `AppError::into_response` and carry `{"error": {"code", "message"}}`
//! instead, so a client can always branch on which key is present.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Success envelope around a serializable payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Bodyless success, for deletes and other acknowledgement-only calls.
#[must_use]
pub fn ok() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
