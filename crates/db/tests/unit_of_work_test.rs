//! Integration tests for unit-of-work ownership.

mod common;

use ledgerlock_db::{AccountRepository, LedgerError, UnitOfWork};
use ledgerlock_shared::types::{AccountId, Isolation};
use rust_decimal_macros::dec;

use common::sqlite_ledger;

#[tokio::test]
async fn test_owned_unit_commits_on_success() {
    let ledger = sqlite_ledger().await;
    let repo = AccountRepository::new(ledger.gateway.clone());

    let unit = UnitOfWork::enter(&ledger.gateway, None, Isolation::Serializable)
        .await
        .unwrap();
    assert!(unit.is_owned());
    let outcome = repo.create(Some(unit.conn()), dec!(100)).await;
    let id = unit.finish(outcome).await.unwrap();

    assert_eq!(repo.get_balance(None, id).await.unwrap(), dec!(100));
}

#[tokio::test]
async fn test_owned_unit_rolls_back_on_failure() {
    let ledger = sqlite_ledger().await;
    let repo = AccountRepository::new(ledger.gateway.clone());

    let unit = UnitOfWork::enter(&ledger.gateway, None, Isolation::Serializable)
        .await
        .unwrap();
    let id = repo.create(Some(unit.conn()), dec!(100)).await.unwrap();
    let outcome: Result<(), LedgerError> = Err(LedgerError::NotFound(AccountId(99)));
    let err = unit.finish(outcome).await.unwrap_err();

    assert!(matches!(err, LedgerError::NotFound(AccountId(99))));
    assert!(matches!(
        repo.get_account(None, id).await,
        Err(LedgerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_borrowed_unit_is_left_to_its_owner() {
    let ledger = sqlite_ledger().await;
    let repo = AccountRepository::new(ledger.gateway.clone());
    let txn = ledger
        .gateway
        .open_unit_of_work(Isolation::Serializable)
        .await
        .unwrap();

    // A successful borrowed call must not commit.
    let unit = UnitOfWork::enter(&ledger.gateway, Some(&txn), Isolation::Serializable)
        .await
        .unwrap();
    assert!(!unit.is_owned());
    let outcome = repo.create(Some(unit.conn()), dec!(100)).await;
    let id = unit.finish(outcome).await.unwrap();

    // A failed borrowed call must not roll back.
    let unit = UnitOfWork::enter(&ledger.gateway, Some(&txn), Isolation::Serializable)
        .await
        .unwrap();
    let outcome: Result<(), LedgerError> = Err(LedgerError::Validation("nope".into()));
    assert!(unit.finish(outcome).await.is_err());

    assert_eq!(repo.get_balance(Some(&txn), id).await.unwrap(), dec!(100));
    txn.rollback().await.unwrap();

    assert!(matches!(
        repo.get_account(None, id).await,
        Err(LedgerError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_writes_invisible_until_commit() {
    let ledger = sqlite_ledger().await;
    let repo = AccountRepository::new(ledger.gateway.clone());
    let id = repo.create(None, dec!(100)).await.unwrap();

    let txn = ledger
        .gateway
        .open_unit_of_work(Isolation::Serializable)
        .await
        .unwrap();
    repo.update_balance(Some(&txn), id, dec!(1)).await.unwrap();

    assert_eq!(repo.get_balance(Some(&txn), id).await.unwrap(), dec!(1));
    assert_eq!(repo.get_balance(None, id).await.unwrap(), dec!(100));

    txn.commit().await.unwrap();
    assert_eq!(repo.get_balance(None, id).await.unwrap(), dec!(1));
}
