use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::session::{authenticate, CurrentSession};

/// Middleware for authenticated API routes: resolves the session from the
/// request (cookie or bearer header) and injects a `CurrentSession`
/// extension for downstream handlers. No session means 401.
pub async fn session_middleware(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (identity, access_token) = authenticate(&config, &cookies, request.headers())
        .ok_or_else(|| AppError::Auth("Unauthorized".to_string()))?;

    request.extensions_mut().insert(CurrentSession {
        identity,
        access_token,
    });

    Ok(next.run(request).await)
}
