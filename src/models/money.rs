//! Conversion between API decimal amounts and stored cents.
//!
//! The HTTP API speaks decimal currency units (`10.50`), the ledger stores
//! `i64` cents (`1050`). Conversion happens only at the API edge.

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Fractional digits a currency amount may carry.
pub const CENT_SCALE: u32 = 2;

/// Convert a decimal amount into cents.
///
/// Returns `None` when the amount has more than two fractional digits or
/// does not fit into `i64` cents. Sign is preserved; rejecting non-positive
/// amounts is left to the wallet service.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    if amount.normalize().scale() > CENT_SCALE {
        return None;
    }
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}

/// Decimal representation of a cent balance.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CENT_SCALE)
}
