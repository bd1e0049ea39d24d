use std::sync::Arc;

use axum::Router;

use account_cell::router::account_routes;
use auth_cell::router::auth_routes;
use auth_cell::SessionStateService;
use gate_cell::router::page_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>, sessions: SessionStateService) -> Router {
    Router::new()
        // Page zone, gated on every request
        .merge(page_routes(state.clone()))
        // API zone, guarded per route
        .nest("/auth", auth_routes(state.clone(), sessions))
        .nest("/accounts", account_routes(state))
}
