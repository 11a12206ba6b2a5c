//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to a service with the shared store
//! 3. Returns HTTP response (JSON, status code)

/// Administrator endpoints
pub mod admin;
/// Registration and profile endpoints
pub mod customers;
pub mod health;
/// Deposit, withdraw, transfer and history endpoints
pub mod transactions;
