use std::sync::Arc;

use axum::{
    routing::{patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn account_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::create_account).get(handlers::list_accounts))
        .route("/me", patch(handlers::update_my_profile))
        .route("/{user_id}/activation", patch(handlers::set_activation))
        .route("/{user_id}/password-reset", post(handlers::reset_password))
        .route("/{user_id}/role", patch(handlers::set_role))
        .with_state(state)
}
