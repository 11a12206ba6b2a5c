//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Every variant is recovered at the HTTP boundary and surfaced to the
/// caller as a JSON error body. None of them are fatal to the process.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing API keys, admin-only routes
/// - **Resource Errors**: Requested customers, accounts or records not found
/// - **Ledger Errors**: Money movements that violate balance or recipient rules
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing or does not belong to any customer.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Authenticated caller is not allowed on this route.
    #[error("Forbidden")]
    Forbidden,

    /// Customer has no account, or the account number is unknown.
    #[error("Account not found")]
    AccountNotFound,

    #[error("Customer not found")]
    CustomerNotFound,

    #[error("Transaction not found")]
    TransactionNotFound,

    /// Caller's own account has been deactivated by an administrator.
    #[error("Account is inactive")]
    AccountInactive,

    /// Customer has registered but not yet been approved.
    #[error("Your account is not approved yet")]
    UnapprovedAccount,

    /// Withdrawal or transfer exceeds the available balance.
    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Recipient account not found")]
    RecipientNotFound,

    #[error("Recipient account is inactive")]
    InactiveRecipient,

    #[error("Cannot transfer to your own account")]
    SelfTransfer,

    #[error("Username is already taken")]
    UsernameTaken,

    /// Request body or parameters are invalid.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Database errors are logged and hidden behind a generic 500 message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "invalid_api_key",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::AccountNotFound => {
                (StatusCode::NOT_FOUND, "account_not_found", self.to_string())
            }
            AppError::CustomerNotFound => {
                (StatusCode::NOT_FOUND, "customer_not_found", self.to_string())
            }
            AppError::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                "transaction_not_found",
                self.to_string(),
            ),
            AppError::AccountInactive => {
                (StatusCode::FORBIDDEN, "account_inactive", self.to_string())
            }
            AppError::UnapprovedAccount => (
                StatusCode::FORBIDDEN,
                "unapproved_account",
                self.to_string(),
            ),
            AppError::InsufficientFunds => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_funds",
                self.to_string(),
            ),
            AppError::RecipientNotFound => (
                StatusCode::NOT_FOUND,
                "recipient_not_found",
                self.to_string(),
            ),
            AppError::InactiveRecipient => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "inactive_recipient",
                self.to_string(),
            ),
            AppError::SelfTransfer => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "self_transfer",
                self.to_string(),
            ),
            AppError::UsernameTaken => (StatusCode::CONFLICT, "username_taken", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(ref e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_client_statuses() {
        let cases = [
            (AppError::InsufficientFunds, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::RecipientNotFound, StatusCode::NOT_FOUND),
            (AppError::SelfTransfer, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InactiveRecipient, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::UnapprovedAccount, StatusCode::FORBIDDEN),
            (AppError::InvalidApiKey, StatusCode::UNAUTHORIZED),
            (
                AppError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
