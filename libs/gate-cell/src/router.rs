use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;

use crate::gate::request_gate;
use crate::handlers;

/// Page routes with the request gate layered in front. Every route here is
/// evaluated by the gate on every request.
pub fn page_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::landing_page))
        .route("/login", get(handlers::login_page))
        .route("/signup", get(handlers::signup_page))
        .route("/forgot-password", get(handlers::forgot_password_page))
        .route("/account-request", get(handlers::account_request_page))
        .route("/change-password", get(handlers::change_password_page))
        .route("/dashboard", get(handlers::dashboard_page))
        .route("/superadmin", get(handlers::superadmin_page))
        .route("/admin-clinical", get(handlers::admin_clinical_page))
        .route("/book/{slug}", get(handlers::public_booking_page))
        .route("/api/health", get(handlers::health_check))
        .layer(middleware::from_fn_with_state(state.clone(), request_gate))
        .with_state(state)
}
