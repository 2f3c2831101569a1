//! Wallet ledger service.
//!
//! Tracks per-wallet balances and records every deposit and withdrawal in an
//! append-only ledger. A balance never goes negative, each mutation commits
//! its balance change and ledger entry together, and concurrent operations on
//! one wallet are serialized by the store's transactions.
//!
//! # Layers
//!
//! - [`handlers`] / [`routes`]: HTTP API (Axum)
//! - [`services`]: business rules and the transaction protocol
//! - [`repository`]: ledger store access (PostgreSQL or in-memory)

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
