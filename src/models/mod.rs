//! Data models representing database entities and API payloads.

/// Ledger entries and operation requests
pub mod ledger;
/// API amounts in decimal units versus stored cents
pub mod money;
/// Wallet balances
pub mod wallet;
