//! In-process store.
//!
//! A unit of work takes the store's async mutex for its whole lifetime and
//! edits a private copy of the state. `commit` swaps the copy in; dropping
//! the unit of work discards it. Units of work are fully serialized.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::{Account, NewAccount},
        customer::{Customer, NewCustomer, UpdateProfileRequest},
        page::PageRequest,
        report::LedgerTotals,
        transaction::{Direction, NewTransaction, Transaction, TransactionEntry, TransactionType},
    },
    store::{LedgerStore, StoreTx},
};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    customers: Vec<Customer>,
    accounts: Vec<Account>,
    /// Append-only, oldest first
    transactions: Vec<Transaction>,
}

impl LedgerState {
    fn account(&self, account_id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == account_id)
    }

    fn customer(&self, customer_id: Uuid) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == customer_id)
    }

    fn account_number(&self, account_id: Uuid) -> Option<String> {
        self.account(account_id).map(|a| a.account_number.clone())
    }

    /// Join a record with the account numbers it refers to.
    fn entry(&self, transaction: &Transaction) -> TransactionEntry {
        TransactionEntry {
            account_number: self
                .account_number(transaction.account_id)
                .unwrap_or_default(),
            counterpart_account_number: transaction
                .counterpart_account_id
                .and_then(|id| self.account_number(id)),
            transaction: transaction.clone(),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<'a, T, U>(
    items: Vec<&'a T>,
    page: PageRequest,
    f: impl FnMut(&'a T) -> U,
) -> (Vec<U>, i64) {
    let total = items.len() as i64;
    let page_items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .map(f)
        .collect();
    (page_items, total)
}

/// Shared handle; clones see the same ledger.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<LedgerState>,
    working: LedgerState,
}

#[async_trait]
impl LedgerStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn find_customer(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self.state.lock().await.customer(customer_id).cloned())
    }

    async fn find_customer_by_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<Customer>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .customers
            .iter()
            .find(|c| c.api_key_hash == key_hash)
            .cloned())
    }

    async fn find_account_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<Account>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.customer_id == customer_id)
            .cloned())
    }

    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .iter()
            .find(|a| a.account_number == account_number)
            .cloned())
    }

    async fn list_transactions(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError> {
        let state = self.state.lock().await;
        let matching = state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.account_id == account_id)
            .collect();
        Ok(paginate(matching, page, |t| state.entry(t)))
    }

    async fn find_transaction(
        &self,
        account_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<TransactionEntry>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .find(|t| t.account_id == account_id && t.transaction_id == transaction_id)
            .map(|t| state.entry(t)))
    }

    async fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionEntry>, AppError> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .map(|t| state.entry(t))
            .collect())
    }

    async fn search_customers(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError> {
        let state = self.state.lock().await;
        let matching = state
            .customers
            .iter()
            .rev()
            .filter(|c| match search {
                None => true,
                Some(term) => {
                    contains_ci(&c.username, term)
                        || contains_ci(&c.first_name, term)
                        || contains_ci(&c.last_name, term)
                        || contains_ci(&c.phone, term)
                }
            })
            .collect();
        Ok(paginate(matching, page, Customer::clone))
    }

    async fn search_transactions(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError> {
        let state = self.state.lock().await;
        let matching = state
            .transactions
            .iter()
            .rev()
            .filter(|t| match search {
                None => true,
                Some(term) => {
                    let account = state.account(t.account_id);
                    let username = account
                        .and_then(|a| state.customer(a.customer_id))
                        .map(|c| c.username.as_str());

                    contains_ci(&t.transaction_id, term)
                        || account.is_some_and(|a| contains_ci(&a.account_number, term))
                        || username.is_some_and(|u| contains_ci(u, term))
                }
            })
            .collect();
        Ok(paginate(matching, page, |t| state.entry(t)))
    }

    async fn ledger_totals(&self) -> Result<LedgerTotals, AppError> {
        let state = self.state.lock().await;

        let sum_where = |f: &dyn Fn(&Transaction) -> bool| -> Decimal {
            state
                .transactions
                .iter()
                .filter(|t| f(*t))
                .map(|t| t.amount)
                .sum()
        };

        Ok(LedgerTotals {
            total_customers: state.customers.len() as i64,
            pending_approvals: state.customers.iter().filter(|c| !c.is_approved).count() as i64,
            total_accounts: state.accounts.len() as i64,
            active_accounts: state.accounts.iter().filter(|a| a.is_active).count() as i64,
            total_balance: state.accounts.iter().map(|a| a.balance).sum(),
            total_deposits: sum_where(&|t| t.transaction_type == TransactionType::Deposit),
            total_withdrawals: sum_where(&|t| t.transaction_type == TransactionType::Withdraw),
            total_transfers: sum_where(&|t| {
                t.transaction_type == TransactionType::Transfer && t.direction == Direction::Debit
            }),
        })
    }

    async fn update_profile(
        &self,
        customer_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Customer>, AppError> {
        let mut state = self.state.lock().await;
        let Some(customer) = state.customers.iter_mut().find(|c| c.id == customer_id) else {
            return Ok(None);
        };

        let fields = [
            (&mut customer.first_name, &update.first_name),
            (&mut customer.last_name, &update.last_name),
            (&mut customer.email, &update.email),
            (&mut customer.phone, &update.phone),
            (&mut customer.address, &update.address),
            (&mut customer.city, &update.city),
            (&mut customer.state, &update.state),
            (&mut customer.pincode, &update.pincode),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }

        Ok(Some(customer.clone()))
    }

    async fn set_approved(
        &self,
        customer_id: Uuid,
        approved: bool,
    ) -> Result<Option<Customer>, AppError> {
        let mut state = self.state.lock().await;
        Ok(state
            .customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .map(|c| {
                c.is_approved = approved;
                c.clone()
            }))
    }

    async fn set_account_active(
        &self,
        customer_id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, AppError> {
        let mut state = self.state.lock().await;
        Ok(state
            .accounts
            .iter_mut()
            .find(|a| a.customer_id == customer_id)
            .map(|a| {
                a.is_active = active;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        Ok(self.working.account(account_id).cloned())
    }

    async fn account_id_by_number(
        &mut self,
        account_number: &str,
    ) -> Result<Option<Uuid>, AppError> {
        Ok(self
            .working
            .accounts
            .iter()
            .find(|a| a.account_number == account_number)
            .map(|a| a.id))
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, AppError> {
        Ok(self.working.customers.iter().any(|c| c.username == username))
    }

    async fn account_number_exists(&mut self, account_number: &str) -> Result<bool, AppError> {
        Ok(self
            .working
            .accounts
            .iter()
            .any(|a| a.account_number == account_number))
    }

    async fn transaction_id_exists(&mut self, transaction_id: &str) -> Result<bool, AppError> {
        Ok(self
            .working
            .transactions
            .iter()
            .any(|t| t.transaction_id == transaction_id))
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, AppError> {
        let customer = Customer {
            id: Uuid::new_v4(),
            username: customer.username,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            city: customer.city,
            state: customer.state,
            pincode: customer.pincode,
            api_key_hash: customer.api_key_hash,
            is_approved: false,
            created_at: Utc::now(),
        };
        self.working.customers.push(customer.clone());
        Ok(customer)
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, AppError> {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            customer_id: account.customer_id,
            account_number: account.account_number,
            account_type: account.account_type,
            balance: account.balance,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.working.accounts.push(account.clone());
        Ok(account)
    }

    async fn set_balance(
        &mut self,
        account_id: Uuid,
        balance: Decimal,
    ) -> Result<Account, AppError> {
        // Mirrors the CHECK (balance >= 0) constraint on the accounts table.
        if balance < Decimal::ZERO {
            return Err(AppError::InsufficientFunds);
        }

        let account = self
            .working
            .accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or(AppError::AccountNotFound)?;
        account.balance = balance;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AppError> {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            transaction_id: transaction.transaction_id,
            account_id: transaction.account_id,
            transaction_type: transaction.transaction_type,
            direction: transaction.direction,
            amount: transaction.amount,
            balance_after: transaction.balance_after,
            description: transaction.description,
            counterpart_account_id: transaction.counterpart_account_id,
            created_at: Utc::now(),
        };
        self.working.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn commit(self) -> Result<(), AppError> {
        let MemoryTx {
            mut guard,
            working,
        } = self;
        *guard = working;
        Ok(())
    }
}
