//! Ledger service - Core business logic for money movement.
//!
//! This service handles:
//! - Deposits, withdrawals and transfers
//! - Balance validation
//! - Account opening with an initial deposit
//! - Account number and transaction id generation
//!
//! # Atomicity Guarantees
//!
//! Every balance change and the audit record(s) describing it are written
//! through one `StoreTx`. Any early return drops the unit of work, which rolls
//! back everything written so far.

use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::{Account, AccountType, NewAccount},
        money::{check_balance_limit, validate_amount},
        page::{Page, PageRequest},
        transaction::{
            Direction, LedgerReceipt, NewTransaction, Transaction, TransactionEntry, TransactionType,
        },
    },
    store::{LedgerStore, StoreTx},
};

/// Records per page in a customer's transaction history.
pub const HISTORY_PAGE_SIZE: u32 = 10;

const ACCOUNT_NUMBER_DIGITS: usize = 12;
const TRANSACTION_ID_DIGITS: usize = 10;

fn random_digits(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Candidate account number: twelve random digits.
pub fn generate_account_number() -> String {
    random_digits(ACCOUNT_NUMBER_DIGITS)
}

/// Candidate transaction id: `TXN` followed by ten random digits.
pub fn generate_transaction_id() -> String {
    format!("TXN{}", random_digits(TRANSACTION_ID_DIGITS))
}

/// Draw account numbers until one is not already in storage.
pub async fn unique_account_number<T: StoreTx>(tx: &mut T) -> Result<String, AppError> {
    loop {
        let candidate = generate_account_number();
        if !tx.account_number_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!("account number collision, retrying");
    }
}

/// Draw transaction ids until one is not already in storage.
pub async fn unique_transaction_id<T: StoreTx>(tx: &mut T) -> Result<String, AppError> {
    loop {
        let candidate = generate_transaction_id();
        if !tx.transaction_id_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!("transaction id collision, retrying");
    }
}

fn description_or(description: Option<String>, default: &str) -> String {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Resolve the account a customer may move money from.
///
/// # Errors
///
/// - `CustomerNotFound`: no such customer
/// - `UnapprovedAccount`: customer is awaiting admin approval
/// - `AccountNotFound`: customer has no account
pub async fn account_for_customer<S: LedgerStore>(
    store: &S,
    customer_id: Uuid,
) -> Result<Account, AppError> {
    let customer = store
        .find_customer(customer_id)
        .await?
        .ok_or(AppError::CustomerNotFound)?;

    if !customer.is_approved {
        return Err(AppError::UnapprovedAccount);
    }

    store
        .find_account_by_customer(customer_id)
        .await?
        .ok_or(AppError::AccountNotFound)
}

/// Lock an account inside a unit of work and require it to be active.
async fn lock_active_account<T: StoreTx>(tx: &mut T, account_id: Uuid) -> Result<Account, AppError> {
    let account = tx
        .lock_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    if !account.is_active {
        return Err(AppError::AccountInactive);
    }

    Ok(account)
}

/// Open an account with its initial deposit inside an existing unit of work.
///
/// The caller commits. Used by registration so the customer row, the account
/// and the opening `Deposit` record land together.
pub async fn open_account<T: StoreTx>(
    tx: &mut T,
    customer_id: Uuid,
    account_type: AccountType,
    initial_deposit: Decimal,
) -> Result<(Account, Transaction), AppError> {
    let initial_deposit = validate_amount(initial_deposit)?;
    let account_number = unique_account_number(tx).await?;

    let account = tx
        .insert_account(NewAccount {
            customer_id,
            account_number,
            account_type,
            balance: initial_deposit,
        })
        .await?;

    let transaction_id = unique_transaction_id(tx).await?;
    let transaction = tx
        .insert_transaction(NewTransaction {
            transaction_id,
            account_id: account.id,
            transaction_type: TransactionType::Deposit,
            direction: Direction::Credit,
            amount: initial_deposit,
            balance_after: account.balance,
            description: "Initial deposit".to_string(),
            counterpart_account_id: None,
        })
        .await?;

    Ok((account, transaction))
}

/// Deposit money into an account.
///
/// # Process
///
/// 1. Validate amount (positive, two decimal places)
/// 2. Start unit of work and lock the account
/// 3. Add the amount to the balance
/// 4. Record a `Deposit` with the new balance
/// 5. Commit (or roll back on error)
///
/// # Errors
///
/// - `InvalidRequest`: Amount is not a positive two-place decimal
/// - `AccountNotFound`: Account doesn't exist
/// - `AccountInactive`: Account has been deactivated
pub async fn deposit<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    amount: Decimal,
    description: Option<String>,
) -> Result<LedgerReceipt, AppError> {
    let amount = validate_amount(amount)?;

    let mut tx = store.begin().await?;
    let account = lock_active_account(&mut tx, account_id).await?;

    let new_balance = check_balance_limit(account.balance + amount)?;
    let account = tx.set_balance(account.id, new_balance).await?;

    let transaction_id = unique_transaction_id(&mut tx).await?;
    let transaction = tx
        .insert_transaction(NewTransaction {
            transaction_id,
            account_id: account.id,
            transaction_type: TransactionType::Deposit,
            direction: Direction::Credit,
            amount,
            balance_after: account.balance,
            description: description_or(description, "Deposit"),
            counterpart_account_id: None,
        })
        .await?;

    tx.commit().await?;

    tracing::info!(
        account = %account.account_number,
        transaction = %transaction.transaction_id,
        %amount,
        balance = %account.balance,
        "deposit committed"
    );

    Ok(LedgerReceipt {
        account_number: account.account_number,
        balance: account.balance,
        transaction_ids: vec![transaction.transaction_id],
    })
}

/// Withdraw money from an account.
///
/// # Errors
///
/// - `InsufficientFunds`: Amount exceeds the balance (nothing is written)
/// - `AccountNotFound` / `AccountInactive` / `InvalidRequest` as for [`deposit`]
pub async fn withdraw<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    amount: Decimal,
    description: Option<String>,
) -> Result<LedgerReceipt, AppError> {
    let amount = validate_amount(amount)?;

    let mut tx = store.begin().await?;
    let account = lock_active_account(&mut tx, account_id).await?;

    if amount > account.balance {
        tracing::warn!(
            account = %account.account_number,
            %amount,
            balance = %account.balance,
            "withdrawal rejected: insufficient funds"
        );
        return Err(AppError::InsufficientFunds);
    }

    let account = tx.set_balance(account.id, account.balance - amount).await?;

    let transaction_id = unique_transaction_id(&mut tx).await?;
    let transaction = tx
        .insert_transaction(NewTransaction {
            transaction_id,
            account_id: account.id,
            transaction_type: TransactionType::Withdraw,
            direction: Direction::Debit,
            amount,
            balance_after: account.balance,
            description: description_or(description, "Withdrawal"),
            counterpart_account_id: None,
        })
        .await?;

    tx.commit().await?;

    tracing::info!(
        account = %account.account_number,
        transaction = %transaction.transaction_id,
        %amount,
        balance = %account.balance,
        "withdrawal committed"
    );

    Ok(LedgerReceipt {
        account_number: account.account_number,
        balance: account.balance,
        transaction_ids: vec![transaction.transaction_id],
    })
}

/// Transfer money from an account to another account identified by number.
///
/// # Process
///
/// 1. Validate amount
/// 2. Resolve the recipient number (`RecipientNotFound`), reject the sender's own number (`SelfTransfer`)
/// 3. Lock both rows in id order so opposing transfers cannot deadlock
/// 4. Check the recipient is active (`InactiveRecipient`) and the sender can cover the amount (`InsufficientFunds`)
/// 5. Debit sender, credit recipient, write one `Transfer` record per side
/// 6. Commit ALL changes atomically
///
/// The receipt carries the sender's new balance and both record ids, sender first.
pub async fn transfer<S: LedgerStore>(
    store: &S,
    from_account_id: Uuid,
    to_account_number: &str,
    amount: Decimal,
    description: Option<String>,
) -> Result<LedgerReceipt, AppError> {
    let amount = validate_amount(amount)?;

    let to_account_number = to_account_number.trim();
    if to_account_number.is_empty() {
        return Err(AppError::InvalidRequest(
            "Recipient account number is required".to_string(),
        ));
    }

    let mut tx = store.begin().await?;

    let to_account_id = tx
        .account_id_by_number(to_account_number)
        .await?
        .ok_or(AppError::RecipientNotFound)?;

    if to_account_id == from_account_id {
        return Err(AppError::SelfTransfer);
    }

    let (sender, recipient) = if from_account_id < to_account_id {
        let sender = tx.lock_account(from_account_id).await?;
        let recipient = tx.lock_account(to_account_id).await?;
        (sender, recipient)
    } else {
        let recipient = tx.lock_account(to_account_id).await?;
        let sender = tx.lock_account(from_account_id).await?;
        (sender, recipient)
    };

    let sender = sender.ok_or(AppError::AccountNotFound)?;
    let recipient = recipient.ok_or(AppError::RecipientNotFound)?;

    if !sender.is_active {
        return Err(AppError::AccountInactive);
    }
    if !recipient.is_active {
        return Err(AppError::InactiveRecipient);
    }
    if amount > sender.balance {
        tracing::warn!(
            account = %sender.account_number,
            %amount,
            balance = %sender.balance,
            "transfer rejected: insufficient funds"
        );
        return Err(AppError::InsufficientFunds);
    }

    let credited = check_balance_limit(recipient.balance + amount)?;
    let sender = tx.set_balance(sender.id, sender.balance - amount).await?;
    let recipient = tx.set_balance(recipient.id, credited).await?;

    let description = description_or(description, "Transfer");

    let sent_id = unique_transaction_id(&mut tx).await?;
    let sent = tx
        .insert_transaction(NewTransaction {
            transaction_id: sent_id,
            account_id: sender.id,
            transaction_type: TransactionType::Transfer,
            direction: Direction::Debit,
            amount,
            balance_after: sender.balance,
            description: format!("Transfer to {} - {}", recipient.account_number, description),
            counterpart_account_id: Some(recipient.id),
        })
        .await?;

    let received_id = unique_transaction_id(&mut tx).await?;
    let received = tx
        .insert_transaction(NewTransaction {
            transaction_id: received_id,
            account_id: recipient.id,
            transaction_type: TransactionType::Transfer,
            direction: Direction::Credit,
            amount,
            balance_after: recipient.balance,
            description: format!("Transfer from {} - {}", sender.account_number, description),
            counterpart_account_id: Some(sender.id),
        })
        .await?;

    tx.commit().await?;

    tracing::info!(
        from = %sender.account_number,
        to = %recipient.account_number,
        %amount,
        sent = %sent.transaction_id,
        received = %received.transaction_id,
        "transfer committed"
    );

    Ok(LedgerReceipt {
        account_number: sender.account_number,
        balance: sender.balance,
        transaction_ids: vec![sent.transaction_id, received.transaction_id],
    })
}

/// Transaction history of one account, newest first.
pub async fn history<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    page: Option<u32>,
) -> Result<Page<TransactionEntry>, AppError> {
    let request = PageRequest::new(page, HISTORY_PAGE_SIZE);
    let (transactions, total) = store.list_transactions(account_id, request).await?;
    Ok(Page::new(transactions, request, total))
}

/// Get one of an account's records by its public id.
pub async fn get_transaction<S: LedgerStore>(
    store: &S,
    account_id: Uuid,
    transaction_id: &str,
) -> Result<TransactionEntry, AppError> {
    store
        .find_transaction(account_id, transaction_id)
        .await?
        .ok_or(AppError::TransactionNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_numbers_are_twelve_digits() {
        let number = generate_account_number();
        assert_eq!(number.len(), 12);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn transaction_ids_carry_prefix_and_ten_digits() {
        let id = generate_transaction_id();
        assert_eq!(id.len(), 13);
        assert!(id.starts_with("TXN"));
        assert!(id[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn blank_descriptions_fall_back_to_default() {
        assert_eq!(description_or(None, "Deposit"), "Deposit");
        assert_eq!(description_or(Some("  ".into()), "Deposit"), "Deposit");
        assert_eq!(description_or(Some(" Rent ".into()), "Transfer"), "Rent");
    }
}
