use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::session::{
    apply_session_cookies, clear_session_cookies, resolve_session, ResolvedSession,
};

use crate::models::{decide, GateDecision};
use crate::zone::{classify, PathZone, LOGIN_PATH};

fn redirect(target: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, target.to_string())]).into_response()
}

/// Edge authorization middleware for page routes.
///
/// Resolves the session from cookies (refreshing an expired access token
/// through the refresh grant and re-setting the cookies), resolves the
/// Profile, and turns the pure gate decision into a response. Identity or
/// Profile resolution errors fail closed: they are logged and treated as
/// "no session" / "no profile", never surfaced to the caller.
pub async fn request_gate(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // API routes carry their own guards.
    if classify(&path) == PathZone::Api {
        return next.run(request).await;
    }

    let session = resolve_session(&config, &cookies, request.headers()).await;

    // Cookie refresh side effect: rotated tokens ride on this response no
    // matter what the gate decides next.
    if let Some(ResolvedSession { refreshed: Some(tokens), .. }) = &session {
        apply_session_cookies(&cookies, tokens);
    }

    let profile = match &session {
        Some(s) => {
            let client = SupabaseClient::new(&config);
            match client.resolve_profile(&s.identity.id).await {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Profile resolution failed for {}: {}", s.identity.id, e);
                    None
                }
            }
        }
        None => None,
    };

    let decision = decide(session.as_ref().map(|s| &s.identity), profile.as_ref(), &path);
    debug!("Gate decision for {}: {:?}", path, decision);

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::ToLoginDeactivated => {
            // Deactivation invalidates the session as part of the redirect.
            // The upstream sign-out is best-effort; the cookies go either way.
            if let Some(s) = &session {
                let client = SupabaseClient::new(&config);
                if let Err(e) = client.sign_out(&s.access_token).await {
                    warn!("Sign-out for deactivated account failed: {}", e);
                }
            }
            clear_session_cookies(&cookies);
            redirect(
                GateDecision::ToLoginDeactivated
                    .redirect_target()
                    .unwrap_or(LOGIN_PATH),
            )
        }
        other => redirect(other.redirect_target().unwrap_or(LOGIN_PATH)),
    }
}
