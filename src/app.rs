//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, middleware, state::AppState, store::LedgerStore};

/// Build the full router for a store.
///
/// Public routes: `/health`, `/api/v1/register`. Everything else passes
/// through the API key middleware first.
pub fn router<S: LedgerStore>(state: AppState<S>) -> Router {
    let authenticated_routes = Router::new()
        // Customer routes
        .route("/api/v1/dashboard", get(handlers::customers::dashboard::<S>))
        .route(
            "/api/v1/profile",
            get(handlers::customers::get_profile::<S>).put(handlers::customers::update_profile::<S>),
        )
        .route("/api/v1/deposit", post(handlers::transactions::deposit::<S>))
        .route("/api/v1/withdraw", post(handlers::transactions::withdraw::<S>))
        .route("/api/v1/transfer", post(handlers::transactions::transfer::<S>))
        .route(
            "/api/v1/transactions",
            get(handlers::transactions::list_transactions::<S>),
        )
        .route(
            "/api/v1/transactions/{transaction_id}",
            get(handlers::transactions::get_transaction::<S>),
        )
        // Admin routes
        .route("/api/v1/admin/dashboard", get(handlers::admin::dashboard::<S>))
        .route(
            "/api/v1/admin/customers",
            get(handlers::admin::list_customers::<S>),
        )
        .route(
            "/api/v1/admin/customers/{id}/approve",
            post(handlers::admin::approve_customer::<S>),
        )
        .route(
            "/api/v1/admin/customers/{id}/deactivate",
            post(handlers::admin::deactivate_customer::<S>),
        )
        .route(
            "/api/v1/admin/customers/{id}/activate",
            post(handlers::admin::activate_customer::<S>),
        )
        .route(
            "/api/v1/admin/transactions",
            get(handlers::admin::list_transactions::<S>),
        )
        .route("/api/v1/admin/reports", get(handlers::admin::reports::<S>))
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware::<S>,
        ));

    Router::new()
        // Public routes (no authentication required)
        .route("/health", get(handlers::health::health_check::<S>))
        .route("/api/v1/register", post(handlers::customers::register::<S>))
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
