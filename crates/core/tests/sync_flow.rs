//! Engine-level tests of the optimistic mutation flow against in-memory
//! collaborators.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;

use daybook_core::errors::CoreError;
use daybook_core::finance::{
    Account, AccountKind, FinanceDomain, FlowDirection, Transaction,
};
use daybook_core::ids::EntityId;
use daybook_core::records::EntityKind;
use daybook_core::sync::{EntityEngine, RemoteContext, SyncConfig};

use common::{FailKind, FakePrincipal, MemoryMirror, MemoryRowStore};

fn context(
    primary: Arc<MemoryRowStore>,
    fallback: Arc<MemoryRowStore>,
    principal: Arc<FakePrincipal>,
) -> RemoteContext {
    RemoteContext {
        primary,
        fallback,
        principal,
        mirror: MemoryMirror::new(),
    }
}

fn expense(account_id: EntityId, amount: rust_decimal::Decimal) -> Transaction {
    Transaction {
        id: EntityId::mint_temp(),
        account_id,
        direction: FlowDirection::Expense,
        amount,
        currency: "USD".to_string(),
        category: "groceries".to_string(),
        description: "weekly shop".to_string(),
        occurred_at: Utc::now(),
        tags: Vec::new(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn create_swaps_temp_for_canonical_in_place() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback, FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let account = Account::new("Cash", AccountKind::Cash, "USD");
    let temp_id = account.id.clone();

    let stored = engine.coordinator().create(account).await.unwrap();

    assert!(stored.id.is_canonical());
    let items = engine.cache().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, stored.id);
    assert!(engine.cache().read(|c| c.get(&temp_id).is_none()));
    assert_eq!(primary.row_count(EntityKind::Account), 1);
}

#[tokio::test]
async fn fallback_path_commits_when_primary_is_unreachable() {
    let (primary, fallback) = MemoryRowStore::pair();
    primary.set_fail(Some(FailKind::Unreachable));
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let stored = engine
        .coordinator()
        .create(Account::new("Wallet", AccountKind::Cash, "USD"))
        .await
        .unwrap();

    assert!(stored.id.is_canonical());
    // exactly one row, written through the fallback transport
    assert_eq!(fallback.row_count(EntityKind::Account), 1);
    assert_eq!(fallback.insert_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_write_is_not_retried_on_the_fallback() {
    let (primary, fallback) = MemoryRowStore::pair();
    primary.set_fail(Some(FailKind::Rejected));
    let ctx = context(primary, fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let err = engine
        .coordinator()
        .create(Account::new("Wallet", AccountKind::Cash, "USD"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PartialFailure { .. }));
    assert_eq!(fallback.insert_calls.load(Ordering::SeqCst), 0);
    assert!(engine.cache().items().is_empty());
}

#[tokio::test]
async fn total_create_failure_rolls_back_the_optimistic_insert() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    // one committed account as pre-existing state
    engine
        .coordinator()
        .create(Account::new("Checking", AccountKind::Bank, "USD"))
        .await
        .unwrap();
    let before = engine.cache().items();

    primary.set_fail(Some(FailKind::Unreachable));
    fallback.set_fail(Some(FailKind::Unreachable));
    let err = engine
        .coordinator()
        .create(Account::new("Doomed", AccountKind::Cash, "USD"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PartialFailure { .. }));
    assert_eq!(engine.cache().items(), before);
}

#[tokio::test]
async fn failed_update_restores_the_previous_snapshot() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let stored = engine
        .coordinator()
        .create(Account::new("Checking", AccountKind::Bank, "USD"))
        .await
        .unwrap();
    let before = engine.cache().items();

    primary.set_fail(Some(FailKind::Unreachable));
    fallback.set_fail(Some(FailKind::Unreachable));

    let mut renamed = stored.clone();
    renamed.name = "Renamed".to_string();
    let err = engine.coordinator().update(renamed).await.unwrap_err();

    assert!(matches!(err, CoreError::PartialFailure { .. }));
    assert_eq!(engine.cache().items(), before);
}

#[tokio::test]
async fn updating_a_temporary_entity_falls_through_to_create() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback, FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    // a mirror-restored, never-persisted account
    let offline = Account::new("Offline", AccountKind::Cash, "USD");
    let temp_id = offline.id.clone();
    engine.cache().write(|c| c.insert_front(offline.clone()));

    let mut edited = offline;
    edited.name = "Offline, renamed".to_string();
    let stored = engine.coordinator().update(edited).await.unwrap();

    assert!(stored.id.is_canonical());
    assert_eq!(primary.row_count(EntityKind::Account), 1);
    let items = engine.cache().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Offline, renamed");
    assert!(engine.cache().read(|c| c.get(&temp_id).is_none()));
}

#[tokio::test]
async fn deleting_a_temporary_entity_never_touches_the_store() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let offline = Account::new("Scratch", AccountKind::Cash, "USD");
    let temp_id = offline.id.clone();
    engine.cache().write(|c| c.insert_front(offline));

    engine.coordinator().delete(&temp_id).await.unwrap();

    assert!(engine.cache().items().is_empty());
    assert_eq!(primary.delete_calls.load(Ordering::SeqCst), 0);
    assert_eq!(fallback.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_delete_reinserts_at_the_original_position() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    for name in ["First", "Second", "Third"] {
        engine
            .coordinator()
            .create(Account::new(name, AccountKind::Bank, "USD"))
            .await
            .unwrap();
    }
    let before = engine.cache().items();
    let middle = before[1].id.clone();

    primary.set_fail(Some(FailKind::Unreachable));
    fallback.set_fail(Some(FailKind::Unreachable));
    let err = engine.coordinator().delete(&middle).await.unwrap_err();

    assert!(matches!(err, CoreError::PartialFailure { .. }));
    assert_eq!(engine.cache().items(), before);
}

#[tokio::test]
async fn mutations_are_rejected_before_apply_when_signed_out() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback, FakePrincipal::signed_out());
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let err = engine
        .coordinator()
        .create(Account::new("Wallet", AccountKind::Cash, "USD"))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::NotAuthenticated));
    assert!(engine.cache().items().is_empty());
    assert_eq!(primary.insert_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn resolving_a_named_twin_reuses_the_canonical_account() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback, FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let canonical = engine
        .coordinator()
        .create(Account::new("Cash", AccountKind::Cash, "USD"))
        .await
        .unwrap();
    let inserts_after_create = primary.insert_calls.load(Ordering::SeqCst);

    // a locally-known twin that was never persisted
    let local = Account::new("cash", AccountKind::Cash, "USD");
    let local_id = local.id.clone();
    engine.cache().write(|c| c.insert_front(local));

    let resolved = engine.resolver().resolve_reference(&local_id).await.unwrap();

    assert_eq!(resolved, canonical.id);
    // no second canonical "Cash" account was created
    assert_eq!(primary.insert_calls.load(Ordering::SeqCst), inserts_after_create);
    assert_eq!(primary.row_count(EntityKind::Account), 1);
    // and the cache never shows two entries for the same record
    let ids: Vec<_> = engine.cache().items().into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![canonical.id]);
}

#[tokio::test]
async fn resolving_a_vanished_reference_fails_loudly() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary, fallback, FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let err = engine
        .resolver()
        .resolve_reference(&EntityId::mint_temp())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ReferenceNotFound { .. }));
}

#[tokio::test]
async fn resolving_an_unseen_temp_reference_creates_the_remote_row() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback, FakePrincipal::signed_in("u1"));
    let engine: EntityEngine<Account> = EntityEngine::new(&ctx, SyncConfig::default());

    let local = Account::new("Brand new", AccountKind::Crypto, "USD");
    let local_id = local.id.clone();
    engine.cache().write(|c| c.insert_front(local));

    let resolved = engine.resolver().resolve_reference(&local_id).await.unwrap();

    assert!(resolved.is_canonical());
    assert_eq!(primary.row_count(EntityKind::Account), 1);
    // the cached entity now carries the canonical id, in place
    let items = engine.cache().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, resolved);
}

#[tokio::test]
async fn transaction_commit_adjusts_the_account_balance() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary, fallback, FakePrincipal::signed_in("u1"));
    let finance = FinanceDomain::new(&ctx, SyncConfig::default());

    let mut account = Account::new("Checking", AccountKind::Bank, "USD");
    account.balance = dec!(100);
    let account = finance.accounts.coordinator().create(account).await.unwrap();

    finance
        .record_transaction(expense(account.id.clone(), dec!(40)))
        .await
        .unwrap();

    let balance = finance
        .accounts
        .cache()
        .read(|c| c.get(&account.id).unwrap().balance);
    assert_eq!(balance, dec!(60));
}

#[tokio::test]
async fn failed_transaction_rolls_back_the_balance_companion() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary.clone(), fallback.clone(), FakePrincipal::signed_in("u1"));
    let finance = FinanceDomain::new(&ctx, SyncConfig::default());

    let mut account = Account::new("Checking", AccountKind::Bank, "USD");
    account.balance = dec!(100);
    let account = finance.accounts.coordinator().create(account).await.unwrap();
    let transactions_before = finance.transactions.cache().items();

    primary.set_fail(Some(FailKind::Unreachable));
    fallback.set_fail(Some(FailKind::Unreachable));

    let err = finance
        .record_transaction(expense(account.id.clone(), dec!(40)))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PartialFailure { .. }));
    let balance = finance
        .accounts
        .cache()
        .read(|c| c.get(&account.id).unwrap().balance);
    assert_eq!(balance, dec!(100));
    assert_eq!(finance.transactions.cache().items(), transactions_before);
}

#[tokio::test]
async fn removing_a_transaction_reverses_its_balance_impact() {
    let (primary, fallback) = MemoryRowStore::pair();
    let ctx = context(primary, fallback, FakePrincipal::signed_in("u1"));
    let finance = FinanceDomain::new(&ctx, SyncConfig::default());

    let mut account = Account::new("Checking", AccountKind::Bank, "USD");
    account.balance = dec!(100);
    let account = finance.accounts.coordinator().create(account).await.unwrap();

    let stored = finance
        .record_transaction(expense(account.id.clone(), dec!(40)))
        .await
        .unwrap();
    finance.remove_transaction(&stored.id).await.unwrap();

    let balance = finance
        .accounts
        .cache()
        .read(|c| c.get(&account.id).unwrap().balance);
    assert_eq!(balance, dec!(100));
    assert!(finance.transactions.cache().items().is_empty());
}
