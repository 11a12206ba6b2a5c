//! Aggregate figures for the admin dashboard and reports.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::transaction::TransactionResponse;

/// Raw counts and sums across the whole ledger.
///
/// Sums over empty sets are zero.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct LedgerTotals {
    pub total_customers: i64,
    pub pending_approvals: i64,
    pub total_accounts: i64,
    pub active_accounts: i64,
    pub total_balance: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    /// Sum of sending legs only, so each transfer is counted once
    pub total_transfers: Decimal,
}

/// Admin landing page.
#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_customers: i64,
    pub total_accounts: i64,
    pub total_balance: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub pending_approvals: i64,
    pub recent_transactions: Vec<TransactionResponse>,
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub total_transfers: Decimal,
    pub total_balance: Decimal,
    pub active_accounts: i64,
    pub inactive_accounts: i64,
}
