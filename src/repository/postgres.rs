//! PostgreSQL wallet repository.
//!
//! # Atomicity Guarantees
//!
//! All balance updates happen within PostgreSQL transactions. Each update is
//! a single `UPDATE ... SET balance_cents = balance_cents +/- $1` statement,
//! so concurrent operations on the same wallet serialize on the row lock
//! instead of overwriting each other.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{RepositoryError, WalletRepository, WalletTx};
use crate::{
    db::DbPool,
    models::{
        ledger::{LedgerEntry, Operation},
        wallet::Wallet,
    },
};

/// Name of the CHECK constraint guarding `balance_cents >= 0`.
const BALANCE_CONSTRAINT: &str = "wallets_balance_non_negative";

/// Wallet repository backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgWalletRepository {
    pool: DbPool,
}

impl PgWalletRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// All ledger entries of a wallet, oldest first.
    pub async fn ledger_entries(
        &self,
        wallet_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT wallet_id, operation_type, amount_cents, created_at
            FROM ledger_entries
            WHERE wallet_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn create_wallet(&self, wallet_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO wallets (wallet_id, balance_cents) VALUES ($1, 0)")
            .bind(wallet_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, RepositoryError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT wallet_id, balance_cents, created_at, updated_at
            FROM wallets
            WHERE wallet_id = $1
            "#,
        )
        .bind(wallet_id)
        .fetch_optional(&self.pool)
        .await?
        // No row means the wallet was never created
        .ok_or(RepositoryError::NotFound)?;

        Ok(wallet.balance_cents)
    }

    async fn begin(&self) -> Result<Box<dyn WalletTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgWalletTx { tx }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Open PostgreSQL transaction.
///
/// `sqlx::Transaction` issues a ROLLBACK when dropped without a successful
/// commit, which covers early returns, failed commits and panics.
pub struct PgWalletTx {
    tx: Transaction<'static, Postgres>,
}

impl PgWalletTx {
    async fn append_entry(
        &mut self,
        wallet_id: Uuid,
        operation: Operation,
        amount_cents: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (wallet_id, operation_type, amount_cents)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(wallet_id)
        .bind(operation.as_str())
        .bind(amount_cents)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[async_trait]
impl WalletTx for PgWalletTx {
    async fn deposit(&mut self, wallet_id: Uuid, amount_cents: i64) -> Result<(), RepositoryError> {
        let updated_count = sqlx::query(
            r#"
            UPDATE wallets
            SET balance_cents = balance_cents + $1,
                updated_at = NOW()
            WHERE wallet_id = $2
            "#,
        )
        .bind(amount_cents)
        .bind(wallet_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if updated_count == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.append_entry(wallet_id, Operation::Deposit, amount_cents)
            .await
    }

    async fn withdraw(
        &mut self,
        wallet_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), RepositoryError> {
        // The balance check is part of the UPDATE itself, evaluated against
        // the latest committed row under its lock
        let updated_count = sqlx::query(
            r#"
            UPDATE wallets
            SET balance_cents = balance_cents - $1,
                updated_at = NOW()
            WHERE wallet_id = $2 AND balance_cents >= $1
            "#,
        )
        .bind(amount_cents)
        .bind(wallet_id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if updated_count == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM wallets WHERE wallet_id = $1)")
                    .bind(wallet_id)
                    .fetch_one(&mut *self.tx)
                    .await?;

            return Err(if exists {
                RepositoryError::InsufficientFunds
            } else {
                RepositoryError::NotFound
            });
        }

        self.append_entry(wallet_id, Operation::Withdraw, amount_cents)
            .await
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let PgWalletTx { tx } = *self;
        tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        let PgWalletTx { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}

/// Translate constraint violations into repository errors the service
/// understands. Anything else stays an opaque database error.
fn map_db_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::AlreadyExists;
        }
        if db_err.is_check_violation() && db_err.constraint() == Some(BALANCE_CONSTRAINT) {
            return RepositoryError::InsufficientFunds;
        }
    }
    RepositoryError::Database(err)
}
