//! Runs against a real PostgreSQL database.
//!
//! Ignored by default. Run with:
//! `TEST_DATABASE_URL=postgres://... cargo test --test postgres_test -- --ignored`

use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;
use wallet_ledger::db;
use wallet_ledger::models::ledger::Operation;
use wallet_ledger::repository::{PgWalletRepository, RepositoryError, WalletRepository};
use wallet_ledger::services::wallet_service::{ErrorKind, WalletService};

async fn pg_repository() -> Result<PgWalletRepository> {
    let database_url =
        std::env::var("TEST_DATABASE_URL").context("TEST_DATABASE_URL must be set")?;

    let pool = db::create_pool(&database_url, 20).await?;
    db::run_migrations(&pool).await?;
    Ok(PgWalletRepository::new(pool))
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_pg_deposit_withdraw_and_ledger() -> Result<()> {
    let repo = pg_repository().await?;
    let service = WalletService::new(Arc::new(repo.clone()));
    let wallet_id = Uuid::new_v4();

    service.create_wallet(wallet_id).await?;
    assert_eq!(service.get_balance(wallet_id).await?, 0);

    service.deposit(wallet_id, 50).await?;
    service.withdraw(wallet_id, 30).await?;
    assert_eq!(service.get_balance(wallet_id).await?, 20);

    let err = service.withdraw(wallet_id, 21).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

    let err = service.create_wallet(wallet_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let entries = repo.ledger_entries(wallet_id).await?;
    let recorded: Vec<(Operation, i64)> = entries
        .iter()
        .map(|e| (e.operation, e.amount_cents))
        .collect();
    assert_eq!(
        recorded,
        vec![(Operation::Deposit, 50), (Operation::Withdraw, 30)]
    );

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_pg_duplicate_insert_is_already_exists() -> Result<()> {
    let repo = pg_repository().await?;
    let wallet_id = Uuid::new_v4();

    repo.create_wallet(wallet_id).await?;
    let err = repo.create_wallet(wallet_id).await.unwrap_err();

    assert!(matches!(err, RepositoryError::AlreadyExists));

    Ok(())
}

#[tokio::test]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_pg_dropped_transaction_rolls_back() -> Result<()> {
    let repo = pg_repository().await?;
    let wallet_id = Uuid::new_v4();
    repo.create_wallet(wallet_id).await?;

    {
        let mut tx = repo.begin().await?;
        tx.deposit(wallet_id, 500).await?;
        // Dropped without commit
    }

    assert_eq!(repo.get_balance(wallet_id).await?, 0);
    assert!(repo.ledger_entries(wallet_id).await?.is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires PostgreSQL via TEST_DATABASE_URL"]
async fn test_pg_concurrent_withdrawals_never_overdraw() -> Result<()> {
    let repo = pg_repository().await?;
    let service = WalletService::new(Arc::new(repo));
    let wallet_id = Uuid::new_v4();
    service.create_wallet(wallet_id).await?;
    service.deposit(wallet_id, 1_000).await?;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.withdraw(wallet_id, 1_000).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await? {
            Ok(()) => successes += 1,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InsufficientFunds, "{err}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(service.get_balance(wallet_id).await?, 0);

    Ok(())
}
