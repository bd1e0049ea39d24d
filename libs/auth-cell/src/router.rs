use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;

use crate::handlers::{self, AuthCellState};
use crate::services::SessionStateService;

pub fn auth_routes(config: Arc<AppConfig>, sessions: SessionStateService) -> Router {
    let state = AuthCellState {
        config: config.clone(),
        sessions,
    };

    let public_routes = Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::session))
        // Permanently disabled; kept routable so callers get the
        // explanatory message instead of a 404.
        .route("/signup", post(handlers::signup_disabled))
        .route("/account-request", post(handlers::account_request_disabled));

    let protected_routes = Router::new()
        .route("/change-password", post(handlers::change_password))
        .layer(middleware::from_fn_with_state(config, session_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
