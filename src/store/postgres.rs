//! PostgreSQL-backed store.
//!
//! Every unit of work is a sqlx transaction. Rows touched by a money movement
//! are read with `FOR UPDATE`, so concurrent operations on the same account
//! serialize inside PostgreSQL rather than in the application.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Postgres;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        account::{Account, NewAccount},
        customer::{Customer, NewCustomer, UpdateProfileRequest},
        page::PageRequest,
        report::LedgerTotals,
        transaction::{NewTransaction, Transaction, TransactionEntry},
    },
    store::{LedgerStore, StoreTx},
};

/// Store handle; cheap to clone (the pool is reference counted).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Open PostgreSQL transaction. sqlx rolls it back on drop.
pub struct PgTx {
    tx: sqlx::Transaction<'static, Postgres>,
}

/// Columns of a `TransactionEntry`: the record plus both account numbers.
const ENTRY_SELECT: &str = r#"
    SELECT t.*, a.account_number, ca.account_number AS counterpart_account_number
    FROM transactions t
    JOIN accounts a ON a.id = t.account_id
    LEFT JOIN accounts ca ON ca.id = t.counterpart_account_id
"#;

/// `%term%` pattern for `ILIKE ... ESCAPE '\'`, or NULL when there is no filter.
///
/// Wildcards in the term are escaped so it matches as a literal substring.
fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(|term| {
        let mut pattern = String::with_capacity(term.len() + 2);
        pattern.push('%');
        for c in term.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    })
}

#[async_trait]
impl LedgerStore for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx, AppError> {
        Ok(PgTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_customer(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    async fn find_customer_by_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<Customer>, AppError> {
        let customer =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE api_key_hash = $1")
                .bind(key_hash)
                .fetch_optional(&self.pool)
                .await?;
        Ok(customer)
    }

    async fn find_account_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    async fn find_account_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, AppError> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE account_number = $1")
                .bind(account_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn list_transactions(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError> {
        let transactions = sqlx::query_as::<_, TransactionEntry>(&format!(
            "{ENTRY_SELECT} WHERE t.account_id = $1 ORDER BY t.seq DESC LIMIT $2 OFFSET $3"
        ))
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE account_id = $1")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((transactions, total))
    }

    async fn find_transaction(
        &self,
        account_id: Uuid,
        transaction_id: &str,
    ) -> Result<Option<TransactionEntry>, AppError> {
        let transaction = sqlx::query_as::<_, TransactionEntry>(&format!(
            "{ENTRY_SELECT} WHERE t.account_id = $1 AND t.transaction_id = $2"
        ))
        .bind(account_id)
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(transaction)
    }

    async fn recent_transactions(&self, limit: i64) -> Result<Vec<TransactionEntry>, AppError> {
        let transactions = sqlx::query_as::<_, TransactionEntry>(&format!(
            "{ENTRY_SELECT} ORDER BY t.seq DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    async fn search_customers(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError> {
        let pattern = like_pattern(search);
        let filter = r#"
            $1::text IS NULL
            OR username ILIKE $1 ESCAPE '\'
            OR first_name ILIKE $1 ESCAPE '\'
            OR last_name ILIKE $1 ESCAPE '\'
            OR phone ILIKE $1 ESCAPE '\'
        "#;

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT * FROM customers WHERE {filter} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM customers WHERE {filter}"))
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;

        Ok((customers, total))
    }

    async fn search_transactions(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<TransactionEntry>, i64), AppError> {
        let pattern = like_pattern(search);
        let filter = r#"
            JOIN customers c ON c.id = a.customer_id
            WHERE $1::text IS NULL
               OR t.transaction_id ILIKE $1 ESCAPE '\'
               OR a.account_number ILIKE $1 ESCAPE '\'
               OR c.username ILIKE $1 ESCAPE '\'
        "#;

        let transactions = sqlx::query_as::<_, TransactionEntry>(&format!(
            "{ENTRY_SELECT} {filter} ORDER BY t.seq DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM transactions t JOIN accounts a ON a.id = t.account_id {filter}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((transactions, total))
    }

    async fn ledger_totals(&self) -> Result<LedgerTotals, AppError> {
        let totals = sqlx::query_as::<_, LedgerTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM customers) AS total_customers,
                (SELECT COUNT(*) FROM customers WHERE NOT is_approved) AS pending_approvals,
                (SELECT COUNT(*) FROM accounts) AS total_accounts,
                (SELECT COUNT(*) FROM accounts WHERE is_active) AS active_accounts,
                (SELECT COALESCE(SUM(balance), 0.00) FROM accounts) AS total_balance,
                (SELECT COALESCE(SUM(amount), 0.00) FROM transactions
                    WHERE transaction_type = 'Deposit') AS total_deposits,
                (SELECT COALESCE(SUM(amount), 0.00) FROM transactions
                    WHERE transaction_type = 'Withdraw') AS total_withdrawals,
                (SELECT COALESCE(SUM(amount), 0.00) FROM transactions
                    WHERE transaction_type = 'Transfer' AND direction = 'debit') AS total_transfers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn update_profile(
        &self,
        customer_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                pincode = COALESCE($9, pincode)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.city)
        .bind(&update.state)
        .bind(&update.pincode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn set_approved(
        &self,
        customer_id: Uuid,
        approved: bool,
    ) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "UPDATE customers SET is_approved = $2 WHERE id = $1 RETURNING *",
        )
        .bind(customer_id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn set_account_active(
        &self,
        customer_id: Uuid,
        active: bool,
    ) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET is_active = $2,
                updated_at = NOW()
            WHERE customer_id = $1
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }
}

#[async_trait]
impl StoreTx for PgTx {
    async fn lock_account(&mut self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        // FOR UPDATE ensures no other transaction can modify this row until we commit
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1 FOR UPDATE")
                .bind(account_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(account)
    }

    async fn account_id_by_number(
        &mut self,
        account_number: &str,
    ) -> Result<Option<Uuid>, AppError> {
        let id: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM accounts WHERE account_number = $1")
                .bind(account_number)
                .fetch_optional(&mut *self.tx)
                .await?;
        Ok(id)
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE username = $1)")
                .bind(username)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn account_number_exists(&mut self, account_number: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE account_number = $1)")
                .bind(account_number)
                .fetch_one(&mut *self.tx)
                .await?;
        Ok(exists)
    }

    async fn transaction_id_exists(&mut self, transaction_id: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE transaction_id = $1)",
        )
        .bind(transaction_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                username, first_name, last_name, email, phone,
                address, city, state, pincode, api_key_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(customer.username)
        .bind(customer.first_name)
        .bind(customer.last_name)
        .bind(customer.email)
        .bind(customer.phone)
        .bind(customer.address)
        .bind(customer.city)
        .bind(customer.state)
        .bind(customer.pincode)
        .bind(customer.api_key_hash)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(customer)
    }

    async fn insert_account(&mut self, account: NewAccount) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (customer_id, account_number, account_type, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(account.customer_id)
        .bind(account.account_number)
        .bind(account.account_type)
        .bind(account.balance)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(account)
    }

    async fn set_balance(
        &mut self,
        account_id: Uuid,
        balance: Decimal,
    ) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = $1,
                updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(balance)
        .bind(account_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(AppError::AccountNotFound)?;
        Ok(account)
    }

    async fn insert_transaction(
        &mut self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                transaction_id,
                account_id,
                transaction_type,
                direction,
                amount,
                balance_after,
                description,
                counterpart_account_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(transaction.transaction_id)
        .bind(transaction.account_id)
        .bind(transaction.transaction_type)
        .bind(transaction.direction)
        .bind(transaction.amount)
        .bind(transaction.balance_after)
        .bind(transaction.description)
        .bind(transaction.counterpart_account_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(transaction)
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_term_in_wildcards() {
        assert_eq!(like_pattern(Some("asha")).as_deref(), Some("%asha%"));
        assert_eq!(like_pattern(None), None);
    }

    #[test]
    fn like_pattern_escapes_wildcards_in_term() {
        assert_eq!(
            like_pattern(Some("50%_off")).as_deref(),
            Some(r"%50\%\_off%")
        );
        assert_eq!(like_pattern(Some(r"a\b")).as_deref(), Some(r"%a\\b%"));
    }
}
