//! Fixed-point money helpers.
//!
//! Every monetary value in the ledger is a `rust_decimal::Decimal` with two
//! fractional digits, matching the `NUMERIC(12, 2)` columns in the database.
//! Floating point never touches a balance.

use rust_decimal::Decimal;

use crate::error::AppError;

/// Number of fractional digits carried by every amount and balance.
pub const MONEY_SCALE: u32 = 2;

/// Upper bound (exclusive) for amounts and balances: `NUMERIC(12, 2)` leaves
/// ten integer digits.
pub fn money_limit() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

/// Validate a user-supplied amount and normalize it to two decimal places.
///
/// # Errors
///
/// `InvalidRequest` when the amount is zero or negative, carries more than
/// two fractional digits, or does not fit in ten integer digits.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }

    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::InvalidRequest(
            "Amount must have at most two decimal places".to_string(),
        ));
    }

    if amount >= money_limit() {
        return Err(AppError::InvalidRequest("Amount is too large".to_string()));
    }

    let mut amount = amount;
    amount.rescale(MONEY_SCALE);
    Ok(amount)
}

/// Reject a resulting balance that would overflow the storage column.
pub fn check_balance_limit(balance: Decimal) -> Result<Decimal, AppError> {
    if balance >= money_limit() {
        return Err(AppError::InvalidRequest(
            "Resulting balance exceeds the account limit".to_string(),
        ));
    }
    Ok(balance)
}
