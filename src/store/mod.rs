//! Storage abstraction for the ledger.
//!
//! Services never talk to the database directly. They receive a
//! `LedgerStore`, read through it, and open a `StoreTx` (unit of work) for
//! anything that mutates balances or inserts records. A unit of work either
//! commits explicitly or is rolled back when dropped, so an early `?` return
//! can never leave a balance change without its audit record.
//!
//! Implementations:
//! - [`postgres::PgStore`]: sqlx over PostgreSQL, row locks via `FOR UPDATE`
//! - [`memory::MemoryStore`]: snapshot-and-swap in process memory, used by tests

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::{Account, NewAccount},
        customer::{Customer, NewCustomer, UpdateProfileRequest},
        page::PageRequest,
        report::LedgerTotals,
        transaction::{NewTransaction, Transaction, TransactionEntry},
    },
};

pub mod memory;
pub mod postgres;

/// Read access plus the entry point for atomic units of work.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    type Tx: StoreTx;

    /// Start a unit of work.
    async fn begin(&self) -> Result<Self::Tx, AppError>;

    /// Cheap connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_customer(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError>;

    async fn find_customer_by_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<Customer>, AppError>;

    async fn find_account_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<Account>, AppError>;

    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, AppError>;

    /// Records of one account, newest first, plus the account's record count.
    ///
    /// Records written in the same unit of work come back in reverse write order.
    async fn list_transactions(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError>;

    async fn find_transaction(
        &self,
        account_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<TransactionEntry>, AppError>;

    /// Newest records across every account.
    async fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionEntry>, AppError>;

    /// Case-insensitive substring match on username, first name, last name
    /// and phone. Newest customers first.
    async fn search_customers(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError>;

    /// Case-insensitive substring match on transaction id, account number and
    /// the owner's username. Newest records first.
    async fn search_transactions(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError>;

    async fn ledger_totals(&self) -> Result<LedgerTotals, AppError>;

    async fn update_profile(
        &self,
        customer_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Customer>, AppError>;

    async fn set_approved(
        &self,
        customer_id: Uuid,
        approved: bool,
    ) -> Result<Option<Customer>, AppError>;

    /// Toggle the active flag of the customer's account.
    async fn set_account_active(
        &self,
        customer_id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, AppError>;
}

/// One all-or-nothing storage transaction.
///
/// Dropping a `StoreTx` without calling [`StoreTx::commit`] discards every
/// change made through it.
#[async_trait]
pub trait StoreTx: Send {
    /// Read an account and hold it exclusively until the unit of work ends.
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, AppError>;

    /// Resolve an account number without locking the row.
    async fn account_id_by_number(
        &mut self,
        account_number: &str,
    ) -> Result<Option<Uuid>, AppError>;

    async fn username_exists(&mut self, username: &str) -> Result<bool, AppError>;

    async fn account_number_exists(&mut self, account_number: &str) -> Result<bool, AppError>;

    async fn transaction_id_exists(&mut self, transaction_id: &str) -> Result<bool, AppError>;

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, AppError>;

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, AppError>;

    /// Overwrite a balance and return the updated row.
    async fn set_balance(&mut self, account_id: Uuid, balance: Decimal)
    -> Result<Account, AppError>;

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AppError>;

    async fn commit(self) -> Result<(), AppError>;
}
