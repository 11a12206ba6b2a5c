mod common;

use anyhow::Result;
use common::{approved_holder, min_opening_deposit, record_count, register_request};
use retail_bank_server::error::AppError;
use retail_bank_server::models::customer::UpdateProfileRequest;
use retail_bank_server::models::transaction::TransactionType;
use retail_bank_server::services::{customer_service, ledger_service};
use retail_bank_server::store::LedgerStore;
use retail_bank_server::store::memory::MemoryStore;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_register_opens_account_with_initial_deposit() -> Result<()> {
    let store = MemoryStore::new();

    let registered = customer_service::register(
        &store,
        register_request("asha", dec!(750.00)),
        min_opening_deposit(),
    )
    .await?;

    assert!(!registered.customer.is_approved);
    assert_eq!(registered.account.balance, dec!(750.00));
    assert_eq!(registered.account.account_number.len(), 12);
    assert!(registered.account.is_active);
    assert_eq!(registered.api_key.len(), 64);

    let account = customer_service::get_account(&store, registered.customer.id).await?;
    let history = ledger_service::history(&store, account.id, None).await?;
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].transaction.transaction_type, TransactionType::Deposit);
    assert_eq!(history.items[0].transaction.amount, dec!(750.00));
    assert_eq!(history.items[0].transaction.balance_after, dec!(750.00));
    assert_eq!(history.items[0].transaction.description, "Initial deposit");

    Ok(())
}

#[tokio::test]
async fn test_register_stores_only_the_key_hash() -> Result<()> {
    let store = MemoryStore::new();

    let registered = customer_service::register(
        &store,
        register_request("asha", dec!(500.00)),
        min_opening_deposit(),
    )
    .await?;

    let hash = customer_service::hash_api_key(&registered.api_key);
    let found = store.find_customer_by_key_hash(&hash).await?;
    assert_eq!(found.map(|c| c.id), Some(registered.customer.id));

    let by_plaintext = store.find_customer_by_key_hash(&registered.api_key).await?;
    assert!(by_plaintext.is_none());

    Ok(())
}

#[tokio::test]
async fn test_register_below_minimum_deposit_is_rejected() -> Result<()> {
    let store = MemoryStore::new();

    let result = customer_service::register(
        &store,
        register_request("asha", dec!(499.99)),
        min_opening_deposit(),
    )
    .await;

    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    let (customers, total) = store
        .search_customers(None, retail_bank_server::models::page::PageRequest::new(None, 10))
        .await?;
    assert!(customers.is_empty());
    assert_eq!(total, 0);

    Ok(())
}

#[tokio::test]
async fn test_register_rejects_blank_fields_and_bad_email() -> Result<()> {
    let store = MemoryStore::new();

    let mut blank_city = register_request("asha", dec!(500.00));
    blank_city.city = "  ".to_string();
    let result = customer_service::register(&store, blank_city, min_opening_deposit()).await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));

    let mut bad_email = register_request("asha", dec!(500.00));
    bad_email.email = "not-an-email".to_string();
    let result = customer_service::register(&store, bad_email, min_opening_deposit()).await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() -> Result<()> {
    let store = MemoryStore::new();

    customer_service::register(
        &store,
        register_request("asha", dec!(500.00)),
        min_opening_deposit(),
    )
    .await?;
    let result = customer_service::register(
        &store,
        register_request("asha", dec!(900.00)),
        min_opening_deposit(),
    )
    .await;

    assert!(matches!(result, Err(AppError::UsernameTaken)));
    Ok(())
}

#[tokio::test]
async fn test_unapproved_customer_cannot_move_money() -> Result<()> {
    let store = MemoryStore::new();

    let registered = customer_service::register(
        &store,
        register_request("asha", dec!(500.00)),
        min_opening_deposit(),
    )
    .await?;

    let result = ledger_service::account_for_customer(&store, registered.customer.id).await;
    assert!(matches!(result, Err(AppError::UnapprovedAccount)));

    customer_service::approve(&store, registered.customer.id).await?;
    let account = ledger_service::account_for_customer(&store, registered.customer.id).await?;
    assert_eq!(account.account_number, registered.account.account_number);

    Ok(())
}

#[tokio::test]
async fn test_approve_unknown_customer_is_not_found() -> Result<()> {
    let store = MemoryStore::new();

    let result = customer_service::approve(&store, uuid::Uuid::new_v4()).await;

    assert!(matches!(result, Err(AppError::CustomerNotFound)));
    Ok(())
}

#[tokio::test]
async fn test_deactivate_and_reactivate_account() -> Result<()> {
    let store = MemoryStore::new();
    let holder = approved_holder(&store, "asha", dec!(500.00)).await?;

    let account = customer_service::set_active(&store, holder.customer_id, false).await?;
    assert!(!account.is_active);
    let blocked = ledger_service::deposit(&store, holder.account.id, dec!(1.00), None).await;
    assert!(matches!(blocked, Err(AppError::AccountInactive)));

    let account = customer_service::set_active(&store, holder.customer_id, true).await?;
    assert!(account.is_active);
    ledger_service::deposit(&store, holder.account.id, dec!(1.00), None).await?;
    assert_eq!(record_count(&store, &holder.account).await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_update_profile_changes_only_given_fields() -> Result<()> {
    let store = MemoryStore::new();
    let holder = approved_holder(&store, "asha", dec!(500.00)).await?;

    let updated = customer_service::update_profile(
        &store,
        holder.customer_id,
        UpdateProfileRequest {
            city: Some(" Mumbai ".to_string()),
            ..Default::default()
        },
    )
    .await?;

    assert_eq!(updated.city, "Mumbai");
    assert_eq!(updated.state, "MH");
    assert_eq!(updated.email, "asha@example.com");

    let result = customer_service::update_profile(
        &store,
        holder.customer_id,
        UpdateProfileRequest {
            first_name: Some(String::new()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_customer_listing_search_and_pages() -> Result<()> {
    let store = MemoryStore::new();
    for name in ["asha", "ashok", "ravi"] {
        approved_holder(&store, name, dec!(500.00)).await?;
    }

    let matches = customer_service::list(&store, Some("ASH"), None).await?;
    assert_eq!(matches.total, 2);
    assert!(matches.items.iter().all(|c| c.username.starts_with("ash")));

    let everyone = customer_service::list(&store, None, Some(1)).await?;
    assert_eq!(everyone.total, 3);
    assert_eq!(everyone.items.len(), 3);

    let beyond = customer_service::list(&store, None, Some(2)).await?;
    assert!(beyond.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_dashboard_shows_recent_activity() -> Result<()> {
    let store = MemoryStore::new();
    let holder = approved_holder(&store, "asha", dec!(500.00)).await?;
    for _ in 0..6 {
        ledger_service::deposit(&store, holder.account.id, dec!(10.00), None).await?;
    }

    let dashboard = customer_service::dashboard(&store, holder.customer_id).await?;

    assert_eq!(dashboard.account.balance, dec!(560.00));
    assert_eq!(
        dashboard.recent_transactions.len(),
        customer_service::DASHBOARD_RECENT as usize
    );

    Ok(())
}
