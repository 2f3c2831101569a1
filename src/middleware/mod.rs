//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can short-circuit requests (reject over-limit traffic, non-JSON bodies).

/// Content-Type guard for request bodies
pub mod content_type;
/// Global token-bucket rate limiting
pub mod rate_limit;
