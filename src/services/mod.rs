//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They validate input and drive store transactions through the repository.

pub mod wallet_service;
