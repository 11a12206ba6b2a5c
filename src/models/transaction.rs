//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `Transaction`: immutable audit record written for every money movement
//! - `TransactionEntry`: a record plus the account numbers it refers to
//! - Request types for deposit, withdraw, and transfer operations
//! - `LedgerReceipt`: what a successful money movement returns
//! - `TransactionResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of money movement. Stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

/// Which way money moved on the owning account.
///
/// Both legs of a transfer carry type `Transfer`; the direction tells the
/// sending leg (`Debit`) from the receiving leg (`Credit`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each record:
/// - Belongs to exactly one account and is never updated
/// - Stores the amount and the owning account's balance right after the movement
/// - For transfers, references the account on the other side
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    pub id: Uuid,

    /// Public identifier, `TXN` followed by ten digits
    pub transaction_id: String,

    /// Account this record belongs to
    pub account_id: Uuid,

    pub transaction_type: TransactionType,

    pub direction: Direction,

    /// Must be positive (enforced by CHECK constraint)
    pub amount: Decimal,

    /// Balance snapshot of `account_id` taken after this movement
    pub balance_after: Decimal,

    pub description: String,

    /// Other side of a transfer; NULL for deposits and withdrawals
    pub counterpart_account_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new transaction record.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_id: String,
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    pub direction: Direction,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub counterpart_account_id: Option<Uuid>,
}

/// Request to deposit money into the caller's account.
///
/// # JSON Example
///
/// ```json
/// {
///   "amount": "250.50",
///   "description": "Salary"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Request to withdraw money from the caller's account.
///
/// # Validation
///
/// - Amount must be positive with at most two decimal places
/// - Account must have sufficient balance
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Request to transfer money to another customer's account.
///
/// # JSON Example
///
/// ```json
/// {
///   "to_account_number": "483920175562",
///   "amount": "300.00",
///   "description": "Rent"
/// }
/// ```
///
/// # Atomicity Guarantee
///
/// BOTH balances and BOTH records are written in the same database transaction.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to_account_number: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Outcome of a committed deposit, withdrawal or transfer.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_number": "483920175562",
///   "balance": "950.50",
///   "transaction_ids": ["TXN0123456789", "TXN9876543210"]
/// }
/// ```
///
/// For transfers the first id is the sender's record, the second the recipient's.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerReceipt {
    pub account_number: String,

    /// Caller's balance after the operation
    pub balance: Decimal,

    pub transaction_ids: Vec<String>,
}

/// A record joined with the account numbers on both of its sides.
///
/// This is what every read path returns; `Transaction` alone carries only ids.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionEntry {
    #[sqlx(flatten)]
    pub transaction: Transaction,

    /// Number of the account the record belongs to
    pub account_number: String,

    /// Number of the other account of a transfer
    pub counterpart_account_number: Option<String>,
}

/// Response returned for transaction listings.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: String,
    pub account_number: String,
    pub transaction_type: TransactionType,
    pub direction: Direction,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub counterpart_account_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Convert a joined record to an API TransactionResponse.
///
/// Internal account ids are replaced by the public account numbers.
impl From<TransactionEntry> for TransactionResponse {
    fn from(entry: TransactionEntry) -> Self {
        let TransactionEntry {
            transaction,
            account_number,
            counterpart_account_number,
        } = entry;

        Self {
            transaction_id: transaction.transaction_id,
            account_number,
            transaction_type: transaction.transaction_type,
            direction: transaction.direction,
            amount: transaction.amount,
            balance_after: transaction.balance_after,
            description: transaction.description,
            counterpart_account_number,
            created_at: transaction.created_at,
        }
    }
}
