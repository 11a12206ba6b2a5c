//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Hash it and match it against the admin key or a customer's key
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    error::AppError, services::customer_service::hash_api_key, state::AppState,
    store::LedgerStore,
};

/// Authentication context attached to authenticated requests.
///
/// This is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub enum AuthContext {
    /// Holder of the configured admin key
    Admin,

    /// A registered customer; approval is checked per operation, not here
    Customer { customer_id: Uuid },
}

impl AuthContext {
    /// Customer id of the caller, `Forbidden` for the admin.
    pub fn customer_id(&self) -> Result<Uuid, AppError> {
        match self {
            AuthContext::Customer { customer_id } => Ok(*customer_id),
            AuthContext::Admin => Err(AppError::Forbidden),
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self {
            AuthContext::Admin => Ok(()),
            AuthContext::Customer { .. } => Err(AppError::Forbidden),
        }
    }
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Hash the `<key>` using SHA-256
/// 3. Compare with the admin key hash, else look up a customer with that hash
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
pub async fn auth_middleware<S: LedgerStore>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidApiKey)?;

    // Expected format: "Bearer <api_key>"
    let api_key = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(AppError::InvalidApiKey)?;

    let key_hash = hash_api_key(api_key);

    let auth_context = if key_hash == *state.admin_key_hash {
        AuthContext::Admin
    } else {
        let customer = state
            .store
            .find_customer_by_key_hash(&key_hash)
            .await?
            .ok_or(AppError::InvalidApiKey)?;

        AuthContext::Customer {
            customer_id: customer.id,
        }
    };

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
