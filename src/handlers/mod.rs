//! HTTP request handlers (route handlers).
//!
//! Handlers parse and validate HTTP input, call the wallet service and
//! shape its result into a JSON response. They never touch the store.

/// Service health endpoint
pub mod health;
/// Wallet endpoints
pub mod wallets;
