mod common;

use anyhow::Result;
use common::{approved_holder, min_opening_deposit, register_request};
use retail_bank_server::services::{customer_service, ledger_service, report_service};
use retail_bank_server::store::memory::MemoryStore;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_empty_ledger_reports_zero() -> Result<()> {
    let store = MemoryStore::new();

    let summary = report_service::reports(&store).await?;

    assert_eq!(summary.total_deposits.to_string(), "0.00");
    assert_eq!(summary.total_transfers.to_string(), "0.00");
    assert_eq!(summary.active_accounts, 0);
    assert_eq!(summary.inactive_accounts, 0);

    Ok(())
}

#[tokio::test]
async fn test_totals_by_type_count_each_transfer_once() -> Result<()> {
    let store = MemoryStore::new();
    let a = approved_holder(&store, "asha", dec!(1000.00)).await?;
    let b = approved_holder(&store, "ravi", dec!(500.00)).await?;

    ledger_service::deposit(&store, a.account.id, dec!(250.50), None).await?;
    ledger_service::withdraw(&store, b.account.id, dec!(100.00), None).await?;
    ledger_service::transfer(
        &store,
        a.account.id,
        &b.account.account_number,
        dec!(300.00),
        None,
    )
    .await?;

    let summary = report_service::reports(&store).await?;

    // Opening deposits count as deposits
    assert_eq!(summary.total_deposits, dec!(1750.50));
    assert_eq!(summary.total_withdrawals, dec!(100.00));
    assert_eq!(summary.total_transfers, dec!(300.00));
    assert_eq!(summary.total_balance, dec!(1650.50));

    Ok(())
}

#[tokio::test]
async fn test_account_status_counts() -> Result<()> {
    let store = MemoryStore::new();
    let a = approved_holder(&store, "asha", dec!(500.00)).await?;
    approved_holder(&store, "ravi", dec!(500.00)).await?;
    approved_holder(&store, "meera", dec!(500.00)).await?;

    customer_service::set_active(&store, a.customer_id, false).await?;

    let summary = report_service::reports(&store).await?;
    assert_eq!(summary.active_accounts, 2);
    assert_eq!(summary.inactive_accounts, 1);

    Ok(())
}

#[tokio::test]
async fn test_admin_dashboard_counts_pending_approvals() -> Result<()> {
    let store = MemoryStore::new();
    approved_holder(&store, "asha", dec!(500.00)).await?;
    customer_service::register(
        &store,
        register_request("ravi", dec!(600.00)),
        min_opening_deposit(),
    )
    .await?;

    let dashboard = report_service::dashboard(&store).await?;

    assert_eq!(dashboard.total_customers, 2);
    assert_eq!(dashboard.total_accounts, 2);
    assert_eq!(dashboard.pending_approvals, 1);
    assert_eq!(dashboard.total_balance, dec!(1100.00));
    assert_eq!(dashboard.recent_transactions.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_all_transactions_search_by_account_number() -> Result<()> {
    let store = MemoryStore::new();
    let a = approved_holder(&store, "asha", dec!(500.00)).await?;
    approved_holder(&store, "ravi", dec!(500.00)).await?;
    ledger_service::deposit(&store, a.account.id, dec!(20.00), None).await?;

    let all = report_service::all_transactions(&store, None, None).await?;
    assert_eq!(all.total, 3);

    let mine =
        report_service::all_transactions(&store, Some(&a.account.account_number), None).await?;
    assert_eq!(mine.total, 2);

    let by_user = report_service::all_transactions(&store, Some("RAVI"), None).await?;
    assert_eq!(by_user.total, 1);

    Ok(())
}

#[tokio::test]
async fn test_listed_records_name_their_accounts() -> Result<()> {
    let store = MemoryStore::new();
    let a = approved_holder(&store, "asha", dec!(1000.00)).await?;
    let b = approved_holder(&store, "ravi", dec!(500.00)).await?;
    ledger_service::transfer(
        &store,
        a.account.id,
        &b.account.account_number,
        dec!(300.00),
        None,
    )
    .await?;

    let all = report_service::all_transactions(&store, None, None).await?;
    assert_eq!(all.total, 4);

    // Newest first: received leg, sent leg, then the opening deposits
    let received = &all.items[0];
    let sent = &all.items[1];
    assert_eq!(received.account_number, b.account.account_number);
    assert_eq!(
        received.counterpart_account_number.as_deref(),
        Some(a.account.account_number.as_str())
    );
    assert_eq!(sent.account_number, a.account.account_number);
    assert_eq!(
        sent.counterpart_account_number.as_deref(),
        Some(b.account.account_number.as_str())
    );

    let opening = &all.items[3];
    assert_eq!(opening.description, "Initial deposit");
    assert_eq!(opening.account_number, a.account.account_number);
    assert_eq!(opening.counterpart_account_number, None);

    let dashboard = report_service::dashboard(&store).await?;
    assert_eq!(dashboard.recent_transactions[0].account_number, b.account.account_number);

    Ok(())
}

#[tokio::test]
async fn test_search_treats_wildcards_literally() -> Result<()> {
    let store = MemoryStore::new();
    approved_holder(&store, "asha", dec!(500.00)).await?;

    for term in ["_", "%"] {
        let records = report_service::all_transactions(&store, Some(term), None).await?;
        assert_eq!(records.total, 0);

        let customers = customer_service::list(&store, Some(term), None).await?;
        assert_eq!(customers.total, 0);
    }

    Ok(())
}
