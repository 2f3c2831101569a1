//! Ledger entry models and the wallet operation request.
//!
//! This module defines:
//! - `Operation`: The two kinds of balance mutation (deposit, withdraw)
//! - `LedgerEntry`: Database entity recording one committed operation
//! - `OperationRequest`: Request body for `POST /api/v1/wallet`

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// Kind of balance mutation.
///
/// Spelled `"DEPOSIT"` / `"WITHDRAW"` both on the wire and in the
/// `ledger_entries.operation_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Deposit,
    Withdraw,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Deposit => "DEPOSIT",
            Operation::Withdraw => "WITHDRAW",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column or request value that is neither `DEPOSIT` nor `WITHDRAW`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation type: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Operation::Deposit),
            "WITHDRAW" => Ok(Operation::Withdraw),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operation {
    type Error = UnknownOperation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Represents a ledger entry record from the database.
///
/// # Database Table
///
/// Maps to the `ledger_entries` table. Entries are append-only:
/// - Exactly one entry is written per committed deposit or withdrawal
/// - The entry is inserted in the same transaction as the balance update
/// - Entries are never updated or deleted
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerEntry {
    /// Wallet whose balance this entry changed
    pub wallet_id: Uuid,

    /// Deposit or withdrawal
    #[sqlx(rename = "operation_type", try_from = "String")]
    pub operation: Operation,

    /// Amount in cents
    ///
    /// Always positive (enforced by CHECK constraint)
    pub amount_cents: i64,

    /// When the operation was committed
    pub created_at: DateTime<Utc>,
}

/// Request to deposit into or withdraw from a wallet.
///
/// # JSON Example
///
/// ```json
/// {
///   "walletId": "550e8400-e29b-41d4-a716-446655440000",
///   "operationType": "DEPOSIT",
///   "amount": 10.50
/// }
/// ```
///
/// The wallet id is kept as a string so the handler can reject malformed
/// ids with a proper error envelope. `valletId` is accepted for older clients.
/// `amount` is in currency units with at most two fractional digits; the
/// handler converts it to cents.
#[derive(Debug, Deserialize)]
pub struct OperationRequest {
    #[serde(rename = "walletId", alias = "valletId")]
    pub wallet_id: String,

    #[serde(rename = "operationType")]
    pub operation_type: Operation,

    pub amount: Decimal,
}
