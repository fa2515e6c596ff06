use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::auth::errors::AuthError;
use service::booking::errors::BookingError;
use service::storage::StorageError;

/// One entry of the structured validation report returned as
/// `400 {"errors": [{"field", "message"}, ...]}`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

/// Boundary error type: every service failure is mapped into one of these
/// and nothing else leaves the process. Internal detail is logged, never
/// sent to the client.
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    InvalidCredentials,
    Unauthorized,
    NotFound(String),
    TooManyRequests,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "errors": errors })))
                    .into_response()
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            // Identical for unknown username and wrong password
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Invalid credentials" })),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "unauthorized" })),
            )
                .into_response(),
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "error": "Too many requests, please try again later" })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                error!(error = %detail, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            // Uniqueness violations and store trouble are deliberately not
            // told apart for the client
            AuthError::HashError(m) | AuthError::TokenError(m) | AuthError::Repository(m) => {
                ApiError::Internal(m)
            }
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::Validation(msg) => ApiError::BadRequest(msg),
            BookingError::NotFound => ApiError::NotFound("Booking not found".into()),
            BookingError::Repository(m) => ApiError::Internal(m),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnsupportedType(_) | StorageError::TooLarge { .. } => {
                ApiError::BadRequest(e.to_string())
            }
            StorageError::Io(m) => ApiError::Internal(m),
        }
    }
}
