//! Wallet repository: the only layer that talks to the ledger store.
//!
//! The service layer depends on the [`WalletRepository`] and [`WalletTx`]
//! traits, never on a concrete store. Two stores implement them:
//! - [`PgWalletRepository`]: PostgreSQL through a `sqlx` pool
//! - [`MemoryWalletRepository`]: in-process store with the same transactional contract
//!
//! # Transaction Handles
//!
//! `begin()` hands out a boxed [`WalletTx`]. The handle is consumed by
//! `commit()` or `rollback()`; a handle dropped while still open rolls back.

use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryWalletRepository;
pub use postgres::PgWalletRepository;

/// Errors reported by a ledger store.
///
/// Only the first three variants carry meaning for the service layer.
/// Everything else is treated as the store being unavailable.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No wallet row matches the given id.
    #[error("wallet not found")]
    NotFound,

    /// A wallet row with this id already exists (unique key violation).
    #[error("wallet already exists")]
    AlreadyExists,

    /// The conditional debit matched no row, or the non-negative balance
    /// constraint rejected the update.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Database operation failed (connection, statement, commit).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure raised by a store that is not backed by sqlx.
    #[error("store error: {0}")]
    Store(String),
}

/// Non-transactional wallet operations plus the transaction entry point.
#[async_trait]
pub trait WalletRepository: Send + Sync + 'static {
    /// Insert a wallet with a zero balance.
    async fn create_wallet(&self, wallet_id: Uuid) -> Result<(), RepositoryError>;

    /// Read the committed balance. Fails with `NotFound` when no row matches.
    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, RepositoryError>;

    /// Open a store transaction.
    async fn begin(&self) -> Result<Box<dyn WalletTx>, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// An open store transaction.
///
/// Each mutating call updates the balance and appends a ledger entry inside
/// this transaction. Nothing becomes visible until `commit()` succeeds.
#[async_trait]
pub trait WalletTx: Send {
    /// `balance = balance + amount`, then append a `DEPOSIT` entry.
    async fn deposit(&mut self, wallet_id: Uuid, amount_cents: i64) -> Result<(), RepositoryError>;

    /// `balance = balance - amount` only where `balance >= amount`, then
    /// append a `WITHDRAW` entry. No matching row is `InsufficientFunds`
    /// for an existing wallet and `NotFound` otherwise.
    async fn withdraw(&mut self, wallet_id: Uuid, amount_cents: i64) -> Result<(), RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}
