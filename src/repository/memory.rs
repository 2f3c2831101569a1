//! In-process wallet repository.
//!
//! Keeps wallets and ledger entries behind a single async mutex. A
//! transaction holds the mutex from `begin()` until it is committed, rolled
//! back or dropped, so transactions run one at a time (serializable).
//! Writes are staged on the handle and only applied to the shared state on
//! commit; dropping the handle discards them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{RepositoryError, WalletRepository, WalletTx};
use crate::models::{
    ledger::{LedgerEntry, Operation},
    wallet::Wallet,
};

#[derive(Debug, Default)]
struct LedgerState {
    wallets: HashMap<Uuid, Wallet>,
    entries: Vec<LedgerEntry>,
}

/// Wallet repository that keeps all state in memory.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryWalletRepository {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All committed ledger entries of a wallet, in commit order.
    pub async fn ledger_entries(&self, wallet_id: Uuid) -> Vec<LedgerEntry> {
        let state = self.state.lock().await;
        state
            .entries
            .iter()
            .filter(|entry| entry.wallet_id == wallet_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl WalletRepository for MemoryWalletRepository {
    async fn create_wallet(&self, wallet_id: Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        if state.wallets.contains_key(&wallet_id) {
            return Err(RepositoryError::AlreadyExists);
        }

        let now = Utc::now();
        state.wallets.insert(
            wallet_id,
            Wallet {
                wallet_id,
                balance_cents: 0,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, RepositoryError> {
        let state = self.state.lock().await;
        state
            .wallets
            .get(&wallet_id)
            .map(|wallet| wallet.balance_cents)
            .ok_or(RepositoryError::NotFound)
    }

    async fn begin(&self) -> Result<Box<dyn WalletTx>, RepositoryError> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryWalletTx {
            state,
            balances: HashMap::new(),
            entries: Vec::new(),
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Open in-memory transaction.
pub struct MemoryWalletTx {
    state: OwnedMutexGuard<LedgerState>,
    /// Balances written by this transaction, not yet visible to others
    balances: HashMap<Uuid, i64>,
    entries: Vec<LedgerEntry>,
}

impl MemoryWalletTx {
    fn balance(&self, wallet_id: Uuid) -> Result<i64, RepositoryError> {
        self.balances
            .get(&wallet_id)
            .copied()
            .or_else(|| {
                self.state
                    .wallets
                    .get(&wallet_id)
                    .map(|wallet| wallet.balance_cents)
            })
            .ok_or(RepositoryError::NotFound)
    }

    fn stage(
        &mut self,
        wallet_id: Uuid,
        balance_cents: i64,
        operation: Operation,
        amount_cents: i64,
    ) {
        self.balances.insert(wallet_id, balance_cents);
        self.entries.push(LedgerEntry {
            wallet_id,
            operation,
            amount_cents,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl WalletTx for MemoryWalletTx {
    async fn deposit(&mut self, wallet_id: Uuid, amount_cents: i64) -> Result<(), RepositoryError> {
        let balance = self
            .balance(wallet_id)?
            .checked_add(amount_cents)
            .ok_or_else(|| RepositoryError::Store("balance overflow".to_string()))?;

        self.stage(wallet_id, balance, Operation::Deposit, amount_cents);
        Ok(())
    }

    async fn withdraw(
        &mut self,
        wallet_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), RepositoryError> {
        let balance = self.balance(wallet_id)?;
        if balance < amount_cents {
            return Err(RepositoryError::InsufficientFunds);
        }

        self.stage(wallet_id, balance - amount_cents, Operation::Withdraw, amount_cents);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let MemoryWalletTx {
            mut state,
            balances,
            entries,
        } = *self;

        let now = Utc::now();
        for (wallet_id, balance_cents) in balances {
            if let Some(wallet) = state.wallets.get_mut(&wallet_id) {
                wallet.balance_cents = balance_cents;
                wallet.updated_at = now;
            }
        }
        state.entries.extend(entries);

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        // Staged writes are dropped together with the lock guard
        Ok(())
    }
}
