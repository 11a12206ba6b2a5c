// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use retail_bank_server::models::account::{Account, AccountType};
use retail_bank_server::models::customer::RegisterRequest;
use retail_bank_server::services::{customer_service, ledger_service};
use retail_bank_server::state::AppState;
use retail_bank_server::store::LedgerStore;
use retail_bank_server::store::memory::MemoryStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub const ADMIN_KEY: &str = "test-admin-key";

pub fn min_opening_deposit() -> Decimal {
    dec!(500.00)
}

/// Registration body with every required field filled in.
pub fn register_request(username: &str, initial_deposit: Decimal) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        email: format!("{username}@example.com"),
        phone: "9876543210".to_string(),
        address: "12 MG Road".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        pincode: "411001".to_string(),
        account_type: AccountType::Saving,
        initial_deposit,
    }
}

/// A registered, approved customer with their account and API key.
pub struct Holder {
    pub customer_id: Uuid,
    pub account: Account,
    pub api_key: String,
}

/// Register a customer and approve them.
pub async fn approved_holder(store: &MemoryStore, username: &str, balance: Decimal) -> Result<Holder> {
    let registered = customer_service::register(
        store,
        register_request(username, balance),
        min_opening_deposit(),
    )
    .await?;

    let customer_id = registered.customer.id;
    customer_service::approve(store, customer_id).await?;
    let account = ledger_service::account_for_customer(store, customer_id).await?;

    Ok(Holder {
        customer_id,
        account,
        api_key: registered.api_key,
    })
}

/// Current persisted state of an account.
pub async fn reload(store: &MemoryStore, account: &Account) -> Result<Account> {
    Ok(store
        .find_account_by_number(&account.account_number)
        .await?
        .expect("account exists"))
}

/// Number of records written for an account.
pub async fn record_count(store: &MemoryStore, account: &Account) -> Result<i64> {
    let page = ledger_service::history(store, account.id, None).await?;
    Ok(page.total)
}

pub fn test_state() -> AppState<MemoryStore> {
    AppState::new(MemoryStore::new(), ADMIN_KEY, min_opening_deposit())
}
