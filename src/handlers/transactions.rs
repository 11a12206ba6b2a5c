//! Money movement HTTP handlers.
//!
//! This module implements the customer-facing ledger endpoints:
//! - POST /api/v1/deposit - Add money to the caller's account
//! - POST /api/v1/withdraw - Remove money from the caller's account
//! - POST /api/v1/transfer - Move money to another account by number
//! - GET /api/v1/transactions - Paginated history
//! - GET /api/v1/transactions/{transaction_id} - One record

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        page::{ListQuery, Page},
        transaction::{
            DepositRequest, LedgerReceipt, TransactionResponse, TransferRequest, WithdrawRequest,
        },
    },
    services::{customer_service, ledger_service},
    state::AppState,
    store::LedgerStore,
};

/// Deposit into the caller's account.
///
/// # Request Body
///
/// ```json
/// {
///   "amount": "250.50",
///   "description": "Salary"
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "account_number": "483920175562",
///   "balance": "1250.50",
///   "transaction_ids": ["TXN0123456789"]
/// }
/// ```
pub async fn deposit<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<DepositRequest>,
) -> Result<Json<LedgerReceipt>, AppError> {
    let store = state.store.as_ref();
    let account = ledger_service::account_for_customer(store, auth.customer_id()?).await?;

    let receipt =
        ledger_service::deposit(store, account.id, request.amount, request.description).await?;

    Ok(Json(receipt))
}

/// Withdraw from the caller's account.
///
/// # Validation
///
/// - Customer must be approved
/// - Account must be active and have sufficient balance
pub async fn withdraw<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<WithdrawRequest>,
) -> Result<Json<LedgerReceipt>, AppError> {
    let store = state.store.as_ref();
    let account = ledger_service::account_for_customer(store, auth.customer_id()?).await?;

    let receipt =
        ledger_service::withdraw(store, account.id, request.amount, request.description).await?;

    Ok(Json(receipt))
}

/// Transfer from the caller's account to another account.
///
/// # Atomicity
///
/// Both balances and both records are written in a single database transaction.
/// Either everything succeeds or nothing does.
///
/// # Validation
///
/// - Recipient must exist, be active, and not be the caller's own account
/// - Caller must be approved with sufficient balance
pub async fn transfer<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<LedgerReceipt>, AppError> {
    let store = state.store.as_ref();
    let account = ledger_service::account_for_customer(store, auth.customer_id()?).await?;

    let receipt = ledger_service::transfer(
        store,
        account.id,
        &request.to_account_number,
        request.amount,
        request.description,
    )
    .await?;

    Ok(Json(receipt))
}

/// Caller's transaction history, newest first, 10 per page.
pub async fn list_transactions<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<TransactionResponse>>, AppError> {
    let store = state.store.as_ref();
    let account = customer_service::get_account(store, auth.customer_id()?).await?;

    let page = ledger_service::history(store, account.id, query.page).await?;
    Ok(Json(page.map(Into::into)))
}

/// Get one of the caller's records by its `TXN...` id.
///
/// Returns 404 for ids that belong to other accounts.
pub async fn get_transaction<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, AppError> {
    let store = state.store.as_ref();
    let account = customer_service::get_account(store, auth.customer_id()?).await?;

    let transaction = ledger_service::get_transaction(store, account.id, &transaction_id).await?;
    Ok(Json(transaction.into()))
}
