//! Account data models and API response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a customer's bank account
//! - `AccountType`: Saving or Current
//! - `AccountResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of account opened at registration.
///
/// Stored as TEXT (`'Saving'` / `'Current'`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
pub enum AccountType {
    #[default]
    Saving,
    Current,
}

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Belongs to exactly one customer (via `customer_id`)
/// - Has a 12-digit account number generated at creation and never changed
/// - Has a balance stored as `NUMERIC(12, 2)`
///
/// # Balance Storage
///
/// Balances are fixed-point decimals with two fractional digits. The
/// database CHECK constraint keeps them non-negative.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// Owning customer (one-to-one)
    pub customer_id: Uuid,

    /// Public account number used as a transfer destination
    pub account_number: String,

    pub account_type: AccountType,

    /// Current balance, must be >= 0
    pub balance: Decimal,

    /// Inactive accounts cannot send or receive money
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance or status update
    pub updated_at: DateTime<Utc>,
}

/// Row to insert for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub customer_id: Uuid,
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "account_number": "483920175562",
///   "account_type": "Saving",
///   "balance": "1250.50",
///   "is_active": true,
///   "created_at": "2025-12-20T10:00:00Z",
///   "updated_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Convert database Account to API AccountResponse.
///
/// Internal ids stay on the server; clients address accounts by number.
impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            account_type: account.account_type,
            balance: account.balance,
            is_active: account.is_active,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
