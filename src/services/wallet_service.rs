//! Wallet service - Core business logic for wallet balances.
//!
//! This service handles:
//! - Amount validation
//! - Wallet existence checks
//! - Sufficient-funds checks
//! - The begin / apply / commit-or-rollback protocol around every mutation
//!
//! # Atomicity Guarantees
//!
//! Each deposit or withdrawal runs inside one store transaction that updates
//! the balance and appends the ledger entry. Either both are committed or
//! neither is. The service holds no locks of its own; concurrent operations
//! on the same wallet are serialized by the store.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    models::ledger::Operation,
    repository::{RepositoryError, WalletRepository},
};

/// Step of the transaction protocol at which a mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStage {
    Begin,
    Apply,
    Commit,
}

impl fmt::Display for TxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TxStage::Begin => "begin",
            TxStage::Apply => "apply",
            TxStage::Commit => "commit",
        })
    }
}

/// Coarse classification of a [`WalletError`], independent of where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAmount,
    NotFound,
    AlreadyExists,
    InsufficientFunds,
    Unavailable,
}

/// Errors returned by [`WalletService`].
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// Amount is zero, negative, or finer than one cent.
    #[error("amount must be positive with at most two decimal places")]
    InvalidAmount,

    #[error("wallet not found")]
    NotFound,

    #[error("wallet already exists")]
    AlreadyExists,

    #[error("insufficient funds")]
    InsufficientFunds,

    /// The store failed outside of a transaction.
    #[error("ledger store unavailable: {0}")]
    Unavailable(#[source] RepositoryError),

    /// A deposit or withdrawal failed inside its transaction.
    ///
    /// The store error is kept as the source so callers can still match on
    /// it through [`WalletError::kind`].
    #[error("{operation} failed at {stage} stage: {source}")]
    Transaction {
        operation: Operation,
        stage: TxStage,
        #[source]
        source: RepositoryError,
    },
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidAmount => ErrorKind::InvalidAmount,
            WalletError::NotFound => ErrorKind::NotFound,
            WalletError::AlreadyExists => ErrorKind::AlreadyExists,
            WalletError::InsufficientFunds => ErrorKind::InsufficientFunds,
            WalletError::Unavailable(_) => ErrorKind::Unavailable,
            WalletError::Transaction { source, .. } => match source {
                RepositoryError::NotFound => ErrorKind::NotFound,
                RepositoryError::AlreadyExists => ErrorKind::AlreadyExists,
                RepositoryError::InsufficientFunds => ErrorKind::InsufficientFunds,
                RepositoryError::Database(_) | RepositoryError::Store(_) => {
                    ErrorKind::Unavailable
                }
            },
        }
    }

    /// Stage marker for errors raised inside a transaction.
    pub fn stage(&self) -> Option<TxStage> {
        match self {
            WalletError::Transaction { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Map store errors raised outside a transaction.
impl From<RepositoryError> for WalletError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => WalletError::NotFound,
            RepositoryError::AlreadyExists => WalletError::AlreadyExists,
            RepositoryError::InsufficientFunds => WalletError::InsufficientFunds,
            other => WalletError::Unavailable(other),
        }
    }
}

/// Stateless orchestrator over a [`WalletRepository`].
///
/// Cheap to clone; clones share the repository.
#[derive(Clone)]
pub struct WalletService {
    repo: Arc<dyn WalletRepository>,
}

impl WalletService {
    pub fn new(repo: Arc<dyn WalletRepository>) -> Self {
        Self { repo }
    }

    /// Create a zero-balance wallet.
    ///
    /// Existence is probed with a balance read: a successful read means the
    /// wallet is already there. A concurrent create that wins the race is
    /// reported by the store as a unique violation, which also maps to
    /// `AlreadyExists`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists`: A wallet with this id exists
    /// - `Unavailable`: Store error
    pub async fn create_wallet(&self, wallet_id: Uuid) -> Result<(), WalletError> {
        match self.repo.get_balance(wallet_id).await {
            Ok(_) => return Err(WalletError::AlreadyExists),
            Err(RepositoryError::NotFound) => {}
            Err(err) => return Err(WalletError::Unavailable(err)),
        }

        self.repo.create_wallet(wallet_id).await?;
        tracing::info!(%wallet_id, "wallet created");

        Ok(())
    }

    /// Current committed balance in cents. No side effects.
    ///
    /// # Errors
    ///
    /// - `NotFound`: Wallet was never created
    /// - `Unavailable`: Store error
    pub async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, WalletError> {
        Ok(self.repo.get_balance(wallet_id).await?)
    }

    /// Check that the ledger store is reachable.
    pub async fn ping(&self) -> Result<(), WalletError> {
        self.repo.ping().await.map_err(WalletError::Unavailable)
    }

    /// Add `amount_cents` to a wallet and record a `DEPOSIT` entry.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`: Amount is zero or negative (no store access)
    /// - `Transaction`: Failure at the begin, apply or commit stage
    pub async fn deposit(&self, wallet_id: Uuid, amount_cents: i64) -> Result<(), WalletError> {
        validate_amount(amount_cents)?;

        self.apply(Operation::Deposit, wallet_id, amount_cents)
            .await
    }

    /// Remove `amount_cents` from a wallet and record a `WITHDRAW` entry.
    ///
    /// # Process
    ///
    /// 1. Reject non-positive amounts
    /// 2. Read the committed balance and reject early if it is too low
    /// 3. Debit inside a transaction with a conditional update
    ///
    /// Step 2 only avoids opening a transaction that is bound to fail. The
    /// conditional update in step 3 re-checks the balance under the row
    /// lock, so two concurrent withdrawals can never both pass against the
    /// same stale balance.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`: Amount is zero or negative
    /// - `NotFound`: Wallet was never created
    /// - `InsufficientFunds`: Balance is lower than the amount, either at
    ///   the pre-check or at the apply stage
    /// - `Transaction`: Failure at the begin, apply or commit stage
    pub async fn withdraw(&self, wallet_id: Uuid, amount_cents: i64) -> Result<(), WalletError> {
        validate_amount(amount_cents)?;

        let balance_cents = self.get_balance(wallet_id).await?;
        if balance_cents < amount_cents {
            return Err(WalletError::InsufficientFunds);
        }

        self.apply(Operation::Withdraw, wallet_id, amount_cents)
            .await
    }

    /// Run one balance mutation inside its own store transaction.
    ///
    /// An apply failure rolls back explicitly so a rollback error can be
    /// logged. A failed commit consumes the handle; the store rolls it back
    /// when the handle is dropped.
    async fn apply(
        &self,
        operation: Operation,
        wallet_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), WalletError> {
        let stage_error = |stage, source| WalletError::Transaction {
            operation,
            stage,
            source,
        };

        let mut tx = self
            .repo
            .begin()
            .await
            .map_err(|err| stage_error(TxStage::Begin, err))?;

        let applied = match operation {
            Operation::Deposit => tx.deposit(wallet_id, amount_cents).await,
            Operation::Withdraw => tx.withdraw(wallet_id, amount_cents).await,
        };

        if let Err(err) = applied {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    %wallet_id,
                    %operation,
                    error = %rollback_err,
                    "rollback failed"
                );
            }
            return Err(stage_error(TxStage::Apply, err));
        }

        tx.commit()
            .await
            .map_err(|err| stage_error(TxStage::Commit, err))?;

        tracing::info!(%wallet_id, %operation, amount_cents, "operation committed");

        Ok(())
    }
}

fn validate_amount(amount_cents: i64) -> Result<(), WalletError> {
    if amount_cents <= 0 {
        return Err(WalletError::InvalidAmount);
    }
    Ok(())
}
