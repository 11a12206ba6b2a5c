//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They are generic over the injected `LedgerStore`, so they run the same
//! against PostgreSQL and against the in-memory store used in tests.

pub mod customer_service;
pub mod ledger_service;
pub mod report_service;
