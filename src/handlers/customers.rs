//! Customer self-service HTTP handlers.
//!
//! - POST /api/v1/register - Register and open an account (public)
//! - GET /api/v1/dashboard - Profile, account and recent activity
//! - GET /api/v1/profile - Current profile
//! - PUT /api/v1/profile - Partial profile update

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::customer::{CustomerResponse, DashboardResponse, RegisterRequest, UpdateProfileRequest},
    services::customer_service,
    state::AppState,
    store::LedgerStore,
};

/// Register a new customer.
///
/// # Request Body
///
/// See [`RegisterRequest`]. `initial_deposit` must meet the configured minimum.
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "customer": { "id": "...", "username": "asha", "is_approved": false, ... },
///   "account": { "account_number": "483920175562", "balance": "1000.00", ... },
///   "api_key": "a1b2c3d4e5f6..."
/// }
/// ```
///
/// The `api_key` is only returned here. The customer can sign in right away
/// but cannot move money until an administrator approves them.
pub async fn register<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response =
        customer_service::register(state.store.as_ref(), request, state.min_opening_deposit)
            .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn dashboard<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<DashboardResponse>, AppError> {
    let customer_id = auth.customer_id()?;
    let dashboard = customer_service::dashboard(state.store.as_ref(), customer_id).await?;
    Ok(Json(dashboard))
}

pub async fn get_profile<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer_id = auth.customer_id()?;
    let customer = customer_service::get_customer(state.store.as_ref(), customer_id).await?;
    Ok(Json(customer.into()))
}

/// Update the caller's profile.
///
/// # Request Body
///
/// ```json
/// {
///   "phone": "9123456780",
///   "city": "Mumbai"
/// }
/// ```
///
/// Omitted fields are left unchanged. Username and account details cannot be changed here.
pub async fn update_profile<S: LedgerStore>(
    State(state): State<AppState<S>>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let customer_id = auth.customer_id()?;
    let customer =
        customer_service::update_profile(state.store.as_ref(), customer_id, request).await?;
    Ok(Json(customer.into()))
}
