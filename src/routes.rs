//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    error::panic_response,
    handlers,
    middleware::{
        content_type::require_json,
        rate_limit::{RateLimiter, rate_limit_middleware},
    },
    services::wallet_service::WalletService,
};

/// Build the application router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /api/v1/wallet/create`
/// - `GET /api/v1/wallets/{wallet_id}`
/// - `POST /api/v1/wallet`
///
/// # Layers (outermost first)
///
/// 1. Panic recovery: a panicking handler yields the standard 500 error body
/// 2. Request tracing
/// 3. Shared rate limiter
/// 4. JSON content type guard for requests with a body
pub fn router(service: WalletService, limiter: RateLimiter) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/v1/wallet/create",
            post(handlers::wallets::create_wallet),
        )
        .route(
            "/api/v1/wallets/{wallet_id}",
            get(handlers::wallets::get_balance),
        )
        .route("/api/v1/wallet", post(handlers::wallets::handle_operation))
        .layer(axum_middleware::from_fn(require_json))
        // Reject over-limit traffic before it reaches a handler
        .layer(axum_middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        // Share the wallet service with all handlers via State extraction
        .with_state(service)
}
