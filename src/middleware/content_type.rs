//! Request media type guard.
//!
//! Requests that carry a body must declare `Content-Type: application/json`
//! (parameters such as `charset` are ignored). Bodiless requests pass
//! through untouched. Anything else is rejected with HTTP 415.

use axum::{
    body::HttpBody,
    extract::Request,
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;

const ALLOWED_MEDIA_TYPE: &str = "application/json";

/// JSON content type middleware function.
///
/// # Returns
///
/// - `Ok(Response)` if the body is empty or declared as JSON
/// - `Err(AppError::UnsupportedMediaType)` otherwise (returns 415)
pub async fn require_json(request: Request, next: Next) -> Result<Response, AppError> {
    if request.body().size_hint().exact() == Some(0) {
        return Ok(next.run(request).await);
    }

    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(is_json_media_type);

    if !is_json {
        return Err(AppError::UnsupportedMediaType);
    }

    Ok(next.run(request).await)
}

fn is_json_media_type(header: &str) -> bool {
    let media_type = header.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case(ALLOWED_MEDIA_TYPE)
}
