//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request and response bodies built from them.

/// Bank account model
pub mod account;
/// Customer profile model
pub mod customer;
pub mod money;
pub mod page;
/// Ledger audit records
pub mod transaction;
/// Admin aggregates
pub mod report;
