//! Customer data models and API request/response types.
//!
//! This module defines:
//! - `Customer`: Database entity for a registered bank customer
//! - `RegisterRequest` / `RegisterResponse`: self-service registration
//! - `UpdateProfileRequest`: partial profile update
//! - `CustomerResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::{AccountResponse, AccountType};
use crate::models::transaction::TransactionResponse;

/// Represents a customer record from the database.
///
/// # Database Table
///
/// Maps to the `customers` table. Each customer:
/// - Owns exactly one account (created at registration)
/// - Authenticates with an API key issued once at registration
/// - Cannot move money until an administrator approves them
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,

    /// Unique login name
    pub username: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,

    /// SHA-256 hash of the customer's API key (64 hex characters)
    ///
    /// The plaintext key is returned once in the registration response and never stored.
    pub api_key_hash: String,

    /// Set by an administrator; unapproved customers cannot deposit, withdraw or transfer
    pub is_approved: bool,

    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub api_key_hash: String,
}

/// Request body for registering a new customer.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "asha",
///   "first_name": "Asha",
///   "last_name": "Rao",
///   "email": "asha@example.com",
///   "phone": "9876543210",
///   "address": "12 MG Road",
///   "city": "Pune",
///   "state": "MH",
///   "pincode": "411001",
///   "account_type": "Saving",
///   "initial_deposit": "1000.00"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,

    /// Defaults to `Saving` when omitted
    #[serde(default)]
    pub account_type: AccountType,

    /// Opening balance, must meet the configured minimum
    pub initial_deposit: Decimal,
}

/// Partial profile update. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Response body for customer endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Convert database Customer to API CustomerResponse.
///
/// This transformation removes the `api_key_hash` field
impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            username: customer.username,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            city: customer.city,
            state: customer.state,
            pincode: customer.pincode,
            is_approved: customer.is_approved,
            created_at: customer.created_at,
        }
    }
}

/// Registration result.
///
/// The `api_key` is ONLY included here. It cannot be recovered later.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub customer: CustomerResponse,
    pub account: AccountResponse,
    pub api_key: String,
}

/// Customer dashboard: profile, account and the most recent activity.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub customer: CustomerResponse,
    pub account: AccountResponse,
    pub recent_transactions: Vec<TransactionResponse>,
}
