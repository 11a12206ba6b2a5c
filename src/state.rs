//! Shared application state handed to every handler.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{services::customer_service::hash_api_key, store::LedgerStore};

/// Store plus the settings handlers need at request time.
pub struct AppState<S> {
    pub store: Arc<S>,

    /// SHA-256 hex of the configured admin key; the plaintext is not kept
    pub admin_key_hash: Arc<str>,

    /// Smallest initial deposit accepted at registration
    pub min_opening_deposit: Decimal,
}

// Manual impl: `S` itself need not be Clone, only the Arc is cloned.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            admin_key_hash: Arc::clone(&self.admin_key_hash),
            min_opening_deposit: self.min_opening_deposit,
        }
    }
}

impl<S: LedgerStore> AppState<S> {
    pub fn new(store: S, admin_api_key: &str, min_opening_deposit: Decimal) -> Self {
        Self {
            store: Arc::new(store),
            admin_key_hash: hash_api_key(admin_api_key).into(),
            min_opening_deposit,
        }
    }
}
