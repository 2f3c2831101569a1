//! Wallet data models and API request/response types.
//!
//! This module defines:
//! - `Wallet`: Database entity holding a wallet balance
//! - `CreateWalletResponse`: Response body for wallet creation
//! - `BalanceResponse`: Response body for balance lookups

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// Represents a wallet record from the database.
///
/// # Database Table
///
/// Maps to the `wallets` table. Each wallet:
/// - Is identified by a UUID generated when it is created
/// - Has a balance stored in cents (to avoid floating-point errors)
///
/// # Balance Storage
///
/// Balances are stored as `i64` cents. For example:
/// - 10.50 is stored as 1050 cents
/// - 100.00 is stored as 10000 cents
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Wallet {
    /// Unique identifier for this wallet
    pub wallet_id: Uuid,

    /// Current balance in cents
    ///
    /// Must be >= 0 (enforced by database CHECK constraint).
    pub balance_cents: i64,

    /// Timestamp when the wallet was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last balance change
    pub updated_at: DateTime<Utc>,
}

/// Response body for `POST /api/v1/wallet/create`.
///
/// # JSON Example
///
/// ```json
/// {
///   "walletID": "550e8400-e29b-41d4-a716-446655440000"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CreateWalletResponse {
    #[serde(rename = "walletID")]
    pub wallet_id: Uuid,
}

/// Response body for `GET /api/v1/wallets/{wallet_id}`.
///
/// # JSON Example
///
/// ```json
/// {
///   "wallet_id": "550e8400-e29b-41d4-a716-446655440000",
///   "balance": 20.5
/// }
/// ```
///
/// The balance is rendered as a JSON number in currency units.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub wallet_id: Uuid,

    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}
