//! Customer service - registration, profile and approval workflow.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::Account,
        customer::{
            Customer, CustomerResponse, DashboardResponse, NewCustomer, RegisterRequest,
            RegisterResponse, UpdateProfileRequest,
        },
        page::{Page, PageRequest},
    },
    services::ledger_service,
    store::{LedgerStore, StoreTx},
};

/// Customers per page in the admin listing.
pub const CUSTOMER_PAGE_SIZE: u32 = 10;

/// Recent records shown on the customer dashboard.
pub const DASHBOARD_RECENT: u32 = 5;

/// Generate a new API key (32 random bytes = 64 hex chars).
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// SHA-256 hex digest of an API key, as stored in `customers.api_key_hash`.
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

fn require(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(value.to_string())
}

fn require_email(value: &str) -> Result<String, AppError> {
    let email = require("email", value, 254)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::InvalidRequest(
            "email must be a valid address".to_string(),
        )),
    }
}

/// Register a new customer.
///
/// # Process
///
/// 1. Validate profile fields and the opening deposit
/// 2. Start unit of work, reject a taken username
/// 3. Insert the customer (unapproved) with the hash of a fresh API key
/// 4. Open the account with its initial `Deposit` record
/// 5. Commit, then return the plaintext key (only time it's shown)
///
/// # Errors
///
/// - `InvalidRequest`: missing/oversized field or deposit below `min_opening_deposit`
/// - `UsernameTaken`: username already registered
pub async fn register<S: LedgerStore>(
    store: &S,
    request: RegisterRequest,
    min_opening_deposit: Decimal,
) -> Result<RegisterResponse, AppError> {
    let new_customer = NewCustomer {
        username: require("username", &request.username, 150)?,
        first_name: require("first_name", &request.first_name, 30)?,
        last_name: require("last_name", &request.last_name, 30)?,
        email: require_email(&request.email)?,
        phone: require("phone", &request.phone, 15)?,
        address: require("address", &request.address, 1000)?,
        city: require("city", &request.city, 100)?,
        state: require("state", &request.state, 100)?,
        pincode: require("pincode", &request.pincode, 10)?,
        api_key_hash: String::new(),
    };

    if request.initial_deposit < min_opening_deposit {
        return Err(AppError::InvalidRequest(format!(
            "Initial deposit must be at least {min_opening_deposit}"
        )));
    }

    let api_key = generate_api_key();
    let new_customer = NewCustomer {
        api_key_hash: hash_api_key(&api_key),
        ..new_customer
    };

    let mut tx = store.begin().await?;

    if tx.username_exists(&new_customer.username).await? {
        return Err(AppError::UsernameTaken);
    }

    let customer = tx.insert_customer(new_customer).await?;
    let (account, _) = ledger_service::open_account(
        &mut tx,
        customer.id,
        request.account_type,
        request.initial_deposit,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        username = %customer.username,
        account = %account.account_number,
        "customer registered, awaiting approval"
    );

    Ok(RegisterResponse {
        customer: customer.into(),
        account: account.into(),
        api_key,
    })
}

pub async fn get_customer<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
) -> Result<Customer, AppError> {
    store
        .find_customer(customer_id)
        .await?
        .ok_or(AppError::CustomerNotFound)
}

/// Account owned by a customer, regardless of approval.
pub async fn get_account<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
) -> Result<Account, AppError> {
    store
        .find_account_by_customer(customer_id)
        .await?
        .ok_or(AppError::AccountNotFound)
}

/// Profile, account and most recent activity for the customer dashboard.
pub async fn dashboard<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
) -> Result<DashboardResponse, AppError> {
    let customer = get_customer(store, customer_id).await?;
    let account = get_account(store, customer_id).await?;

    let (recent, _) = store
        .list_transactions(account.id, PageRequest::new(None, DASHBOARD_RECENT))
        .await?;

    Ok(DashboardResponse {
        customer: customer.into(),
        account: account.into(),
        recent_transactions: recent.into_iter().map(Into::into).collect(),
    })
}

/// Apply a partial profile update. Provided fields must be non-blank.
pub async fn update_profile<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
    request: UpdateProfileRequest,
) -> Result<Customer, AppError> {
    let check = |field: &str, value: Option<String>, max_len: usize| {
        value.map(|v| require(field, &v, max_len)).transpose()
    };

    let update = UpdateProfileRequest {
        first_name: check("first_name", request.first_name, 30)?,
        last_name: check("last_name", request.last_name, 30)?,
        email: request.email.as_deref().map(require_email).transpose()?,
        phone: check("phone", request.phone, 15)?,
        address: check("address", request.address, 1000)?,
        city: check("city", request.city, 100)?,
        state: check("state", request.state, 100)?,
        pincode: check("pincode", request.pincode, 10)?,
    };

    store
        .update_profile(customer_id, &update)
        .await?
        .ok_or(AppError::CustomerNotFound)
}

/// Mark a customer as approved so they can move money.
pub async fn approve<S: LedgerStore>(store: &S, customer_id: Uuid) -> Result<Customer, AppError> {
    let customer = store
        .set_approved(customer_id, true)
        .await?
        .ok_or(AppError::CustomerNotFound)?;

    tracing::info!(username = %customer.username, "customer approved");
    Ok(customer)
}

/// Activate or deactivate a customer's account.
///
/// # Errors
///
/// - `CustomerNotFound`: no such customer
/// - `AccountNotFound`: customer exists but has no account
pub async fn set_active<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
    active: bool,
) -> Result<Account, AppError> {
    get_customer(store, customer_id).await?;

    let account = store
        .set_account_active(customer_id, active)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    tracing::info!(
        account = %account.account_number,
        active,
        "account status changed"
    );
    Ok(account)
}

/// Admin listing with optional search.
pub async fn list<S: LedgerStore>(
    store: &S,
    search: Option<&str>,
    page: Option<u32>,
) -> Result<Page<CustomerResponse>, AppError> {
    let request = PageRequest::new(page, CUSTOMER_PAGE_SIZE);
    let (customers, total) = store.search_customers(search, request).await?;
    Ok(Page::new(customers, request, total).map(Into::into))
}
