//! Retail banking ledger service.
//!
//! Customers register with an opening deposit, wait for administrator
//! approval, then deposit, withdraw and transfer between accounts.
//! Administrators approve customers, (de)activate accounts and read
//! aggregate reports.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind the `LedgerStore` trait
//! - **Money**: `rust_decimal` fixed-point, two fractional digits
//! - **Authentication**: API key with SHA-256 hashing
//! - **Format**: JSON requests/responses

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
