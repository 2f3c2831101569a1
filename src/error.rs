//! Error types and HTTP error response handling.
//!
//! This module defines all API-level errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use std::any::Any;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::services::wallet_service::{ErrorKind, WalletError};

/// Application-wide error type returned by handlers and middleware.
///
/// # Error Categories
///
/// - **Wallet Errors**: Anything returned by the wallet service
/// - **Validation Errors**: Malformed ids or request bodies
/// - **Rate Limiting**: Request rejected before reaching a handler
/// - **Transport**: Unsupported body media type, panicking handler
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Error returned by the wallet service.
    ///
    /// The status code depends on [`WalletError::kind`].
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Global request budget exhausted.
    ///
    /// Returns HTTP 429 Too Many Requests.
    #[error("Too many requests")]
    RateLimited,

    /// Request body is not `application/json`.
    ///
    /// Returns HTTP 415 Unsupported Media Type.
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    /// A handler panicked while serving the request.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("An internal error occurred")]
    Internal,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `NotFound` → 404 Not Found
/// - `InvalidAmount`, `InsufficientFunds`, `InvalidRequest` → 400 Bad Request
/// - `AlreadyExists` → 409 Conflict
/// - `UnsupportedMediaType` → 415 Unsupported Media Type
/// - `RateLimited` → 429 Too Many Requests
/// - `Unavailable`, `Internal` → 500 Internal Server Error (details are logged, not returned)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Wallet(err) => match err.kind() {
                ErrorKind::InvalidAmount => {
                    (StatusCode::BAD_REQUEST, "invalid_amount", err.to_string())
                }
                ErrorKind::InsufficientFunds => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    err.to_string(),
                ),
                ErrorKind::NotFound => {
                    (StatusCode::NOT_FOUND, "wallet_not_found", err.to_string())
                }
                ErrorKind::AlreadyExists => (
                    StatusCode::CONFLICT,
                    "wallet_already_exists",
                    err.to_string(),
                ),
                ErrorKind::Unavailable => {
                    tracing::error!(error = %err, stage = ?err.stage(), "ledger store failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                self.to_string(),
            ),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                self.to_string(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Render a caught handler panic as the standard 500 error body.
///
/// Used as the `CatchPanicLayer` handler; the panic payload is logged only.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");

    AppError::Internal.into_response()
}
