// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;
use wallet_ledger::repository::{
    MemoryWalletRepository, RepositoryError, WalletRepository, WalletTx,
};
use wallet_ledger::services::wallet_service::WalletService;

/// Store call that the faulty repository should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    Read,
    Begin,
    Apply,
    Commit,
    Rollback,
    /// Panic on balance reads
    Panic,
}

/// Counts of store calls that went through the faulty repository.
#[derive(Debug, Clone, Default)]
pub struct CallCounts {
    begins: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    commits: Arc<AtomicUsize>,
    rollbacks: Arc<AtomicUsize>,
}

impl CallCounts {
    pub fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }

    /// Wallet creations plus balance mutations attempted inside transactions
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }
}

fn injected(point: FailPoint) -> RepositoryError {
    RepositoryError::Store(format!("injected {point:?} failure"))
}

/// Wraps the in-memory store and fails selected calls on demand.
pub struct FaultyRepository {
    inner: MemoryWalletRepository,
    fail_points: Vec<FailPoint>,
    stale_balance: Option<i64>,
    counts: CallCounts,
}

impl FaultyRepository {
    pub fn new(inner: MemoryWalletRepository, fail_points: &[FailPoint]) -> Self {
        Self {
            inner,
            fail_points: fail_points.to_vec(),
            stale_balance: None,
            counts: CallCounts::default(),
        }
    }

    /// Report this balance from every non-transactional read, as if the
    /// read raced with another writer.
    pub fn with_stale_balance(mut self, balance_cents: i64) -> Self {
        self.stale_balance = Some(balance_cents);
        self
    }

    pub fn counts(&self) -> CallCounts {
        self.counts.clone()
    }

    fn fails(&self, point: FailPoint) -> bool {
        self.fail_points.contains(&point)
    }
}

#[async_trait]
impl WalletRepository for FaultyRepository {
    async fn create_wallet(&self, wallet_id: Uuid) -> Result<(), RepositoryError> {
        self.counts.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create_wallet(wallet_id).await
    }

    async fn get_balance(&self, wallet_id: Uuid) -> Result<i64, RepositoryError> {
        if self.fails(FailPoint::Panic) {
            panic!("injected panic on balance read");
        }
        if self.fails(FailPoint::Read) {
            return Err(injected(FailPoint::Read));
        }
        let balance = self.inner.get_balance(wallet_id).await?;
        Ok(self.stale_balance.unwrap_or(balance))
    }

    async fn begin(&self) -> Result<Box<dyn WalletTx>, RepositoryError> {
        self.counts.begins.fetch_add(1, Ordering::SeqCst);
        if self.fails(FailPoint::Begin) {
            return Err(injected(FailPoint::Begin));
        }
        Ok(Box::new(FaultyTx {
            inner: self.inner.begin().await?,
            fail_points: self.fail_points.clone(),
            counts: self.counts.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        if self.fails(FailPoint::Read) {
            return Err(injected(FailPoint::Read));
        }
        self.inner.ping().await
    }
}

struct FaultyTx {
    inner: Box<dyn WalletTx>,
    fail_points: Vec<FailPoint>,
    counts: CallCounts,
}

impl FaultyTx {
    fn fails(&self, point: FailPoint) -> bool {
        self.fail_points.contains(&point)
    }
}

#[async_trait]
impl WalletTx for FaultyTx {
    async fn deposit(
        &mut self,
        wallet_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), RepositoryError> {
        self.counts.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.deposit(wallet_id, amount_cents).await?;
        if self.fails(FailPoint::Apply) {
            return Err(injected(FailPoint::Apply));
        }
        Ok(())
    }

    async fn withdraw(
        &mut self,
        wallet_id: Uuid,
        amount_cents: i64,
    ) -> Result<(), RepositoryError> {
        self.counts.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.withdraw(wallet_id, amount_cents).await?;
        if self.fails(FailPoint::Apply) {
            return Err(injected(FailPoint::Apply));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        if this.fails(FailPoint::Commit) {
            // Dropping the inner handle discards the staged writes
            return Err(injected(FailPoint::Commit));
        }
        this.inner.commit().await?;
        this.counts.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        let this = *self;
        this.counts.rollbacks.fetch_add(1, Ordering::SeqCst);
        let fail = this.fails(FailPoint::Rollback);
        this.inner.rollback().await?;
        if fail {
            return Err(injected(FailPoint::Rollback));
        }
        Ok(())
    }
}

/// Service over a fresh in-memory store, plus the store for inspection.
pub fn memory_service() -> (WalletService, MemoryWalletRepository) {
    let repo = MemoryWalletRepository::new();
    let service = WalletService::new(Arc::new(repo.clone()));
    (service, repo)
}

/// Service over a faulty wrapper around `repo`.
pub fn faulty_service(
    repo: &MemoryWalletRepository,
    fail_points: &[FailPoint],
) -> (WalletService, CallCounts) {
    let faulty = FaultyRepository::new(repo.clone(), fail_points);
    let counts = faulty.counts();
    (WalletService::new(Arc::new(faulty)), counts)
}

/// Create a wallet and fund it with `balance_cents`.
pub async fn funded_wallet(service: &WalletService, balance_cents: i64) -> anyhow::Result<Uuid> {
    let wallet_id = Uuid::new_v4();
    service.create_wallet(wallet_id).await?;
    if balance_cents > 0 {
        service.deposit(wallet_id, balance_cents).await?;
    }
    Ok(wallet_id)
}
