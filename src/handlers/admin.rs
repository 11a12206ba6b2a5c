//! Administrator HTTP handlers.
//!
//! Every handler here requires the admin API key:
//! - GET /api/v1/admin/dashboard
//! - GET /api/v1/admin/customers?search=&page=
//! - POST /api/v1/admin/customers/{id}/approve
//! - POST /api/v1/admin/customers/{id}/deactivate
//! - POST /api/v1/admin/customers/{id}/activate
//! - GET /api/v1/admin/transactions?search=&page=
//! - GET /api/v1/admin/reports

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        account::AccountResponse,
        customer::CustomerResponse,
        page::{ListQuery, Page},
        report::{AdminDashboard, ReportSummary},
        transaction::TransactionResponse,
    },
    services::{customer_service, report_service},
    state::AppState,
    store::LedgerStore,
};

pub async fn dashboard<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<AdminDashboard>, AppError> {
    auth.require_admin()?;
    Ok(Json(report_service::dashboard(state.store.as_ref()).await?))
}

/// List customers, newest first, 10 per page.
///
/// `search` matches username, first name, last name or phone (case-insensitive).
pub async fn list_customers<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<CustomerResponse>>, AppError> {
    auth.require_admin()?;
    let page =
        customer_service::list(state.store.as_ref(), query.search_term(), query.page).await?;
    Ok(Json(page))
}

pub async fn approve_customer<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, AppError> {
    auth.require_admin()?;
    let customer = customer_service::approve(state.store.as_ref(), customer_id).await?;
    Ok(Json(customer.into()))
}

/// Deactivate the customer's account. It can no longer send or receive money.
pub async fn deactivate_customer<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    auth.require_admin()?;
    let account = customer_service::set_active(state.store.as_ref(), customer_id, false).await?;
    Ok(Json(account.into()))
}

pub async fn activate_customer<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    auth.require_admin()?;
    let account = customer_service::set_active(state.store.as_ref(), customer_id, true).await?;
    Ok(Json(account.into()))
}

/// Every record in the ledger, newest first, 20 per page.
///
/// `search` matches transaction id, account number or username.
pub async fn list_transactions<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<TransactionResponse>>, AppError> {
    auth.require_admin()?;
    let page =
        report_service::all_transactions(state.store.as_ref(), query.search_term(), query.page)
            .await?;
    Ok(Json(page))
}

pub async fn reports<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReportSummary>, AppError> {
    auth.require_admin()?;
    Ok(Json(report_service::reports(state.store.as_ref()).await?))
}
