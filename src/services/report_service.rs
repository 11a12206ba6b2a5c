//! Report service - aggregate views for administrators.

use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::{
        money::MONEY_SCALE,
        page::{Page, PageRequest},
        report::{AdminDashboard, ReportSummary},
        transaction::TransactionResponse,
    },
    store::LedgerStore,
};

/// Records shown on the admin dashboard.
pub const DASHBOARD_RECENT: i64 = 10;

/// Records per page in the admin transaction listing.
pub const TRANSACTION_PAGE_SIZE: u32 = 20;

fn money(mut value: Decimal) -> Decimal {
    value.rescale(MONEY_SCALE);
    value
}

/// Headline figures plus the newest records across all accounts.
pub async fn dashboard<S: LedgerStore>(store: &S) -> Result<AdminDashboard, AppError> {
    let totals = store.ledger_totals().await?;
    let recent = store.recent_transactions(DASHBOARD_RECENT).await?;

    Ok(AdminDashboard {
        total_customers: totals.total_customers,
        total_accounts: totals.total_accounts,
        total_balance: money(totals.total_balance),
        total_deposits: money(totals.total_deposits),
        total_withdrawals: money(totals.total_withdrawals),
        pending_approvals: totals.pending_approvals,
        recent_transactions: recent.into_iter().map(Into::into).collect(),
    })
}

/// Sums per transaction type and account status counts.
///
/// Each transfer contributes its amount once (the sending leg).
pub async fn reports<S: LedgerStore>(store: &S) -> Result<ReportSummary, AppError> {
    let totals = store.ledger_totals().await?;

    Ok(ReportSummary {
        total_deposits: money(totals.total_deposits),
        total_withdrawals: money(totals.total_withdrawals),
        total_transfers: money(totals.total_transfers),
        total_balance: money(totals.total_balance),
        active_accounts: totals.active_accounts,
        inactive_accounts: totals.total_accounts - totals.active_accounts,
    })
}

/// Every record in the ledger, newest first, with optional search.
pub async fn all_transactions<S: LedgerStore>(
    store: &S,
    search: Option<&str>,
    page: Option<u32>,
) -> Result<Page<TransactionResponse>, AppError> {
    let request = PageRequest::new(page, TRANSACTION_PAGE_SIZE);
    let (transactions, total) = store.search_transactions(search, request).await?;
    Ok(Page::new(transactions, request, total).map(Into::into))
}
