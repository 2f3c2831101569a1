mod common;

use anyhow::Result;
use common::{funded_wallet, memory_service};
use wallet_ledger::models::ledger::Operation;
use wallet_ledger::services::wallet_service::ErrorKind;

const TASKS: usize = 32;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_full_withdrawals_succeed_exactly_once() -> Result<()> {
    let (service, repo) = memory_service();
    let wallet_id = funded_wallet(&service, 10_000).await?;

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.withdraw(wallet_id, 10_000).await })
        })
        .collect();

    let mut successes = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await? {
            Ok(()) => successes += 1,
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::InsufficientFunds, "{err}");
                insufficient += 1;
            }
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(insufficient, TASKS - 1);
    assert_eq!(service.get_balance(wallet_id).await?, 0);

    let withdrawals = repo
        .ledger_entries(wallet_id)
        .await
        .into_iter()
        .filter(|e| e.operation == Operation::Withdraw)
        .count();
    assert_eq!(withdrawals, 1);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_lose_no_updates() -> Result<()> {
    let (service, repo) = memory_service();
    let wallet_id = funded_wallet(&service, 0).await?;

    let handles: Vec<_> = (0..TASKS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.deposit(wallet_id, 25).await })
        })
        .collect();

    for handle in handles {
        handle.await??;
    }

    assert_eq!(service.get_balance(wallet_id).await?, 25 * TASKS as i64);
    assert_eq!(repo.ledger_entries(wallet_id).await.len(), TASKS);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_traffic_never_goes_negative() -> Result<()> {
    let (service, _repo) = memory_service();
    let wallet_id = funded_wallet(&service, 100).await?;

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    service.deposit(wallet_id, 10).await.map(|()| 10)
                } else {
                    service.withdraw(wallet_id, 40).await.map(|()| -40)
                }
            })
        })
        .collect();

    let mut expected = 100;
    for handle in handles {
        match handle.await? {
            Ok(delta) => expected += delta,
            Err(err) => assert_eq!(err.kind(), ErrorKind::InsufficientFunds, "{err}"),
        }
    }

    let balance = service.get_balance(wallet_id).await?;
    assert!(balance >= 0);
    assert_eq!(balance, expected);

    Ok(())
}
