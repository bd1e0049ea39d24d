use axum::http::HeaderMap;
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tower_cookies::{
    cookie::{Cookie, SameSite},
    Cookies,
};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{Identity, TokenPair};

use crate::jwt::validate_token;

pub const ACCESS_TOKEN_COOKIE: &str = "office-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "office-refresh-token";

/// Session attached to a request after authentication. Inserted into request
/// extensions by `session_middleware`; handlers read it via `Extension`.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub identity: Identity,
    pub access_token: String,
}

/// Session resolved by the gate, including rotated tokens when the access
/// token had to be refreshed mid-request.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub identity: Identity,
    pub access_token: String,
    pub refreshed: Option<TokenPair>,
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

fn cookie_value(cookies: &Cookies, name: &str) -> Option<String> {
    cookies.get(name).map(|c| c.value().to_string())
}

/// Authenticate strictly against the current access token (session cookie
/// first, bearer header as fallback). No refresh, no store access; any
/// failure is treated as "no session".
pub fn authenticate(
    config: &AppConfig,
    cookies: &Cookies,
    headers: &HeaderMap,
) -> Option<(Identity, String)> {
    let token = cookie_value(cookies, ACCESS_TOKEN_COOKIE).or_else(|| bearer_token(headers))?;

    match validate_token(&token, &config.supabase_jwt_secret) {
        Ok(identity) => Some((identity, token)),
        Err(reason) => {
            debug!("Access token rejected: {}", reason);
            None
        }
    }
}

/// Resolve the session for a gate invocation. An invalid or expired access
/// token is retried once through the refresh grant; rotated tokens are
/// returned so the caller can re-set the session cookies on the response.
/// Every failure path is fail-closed to "no session".
pub async fn resolve_session(
    config: &AppConfig,
    cookies: &Cookies,
    headers: &HeaderMap,
) -> Option<ResolvedSession> {
    let access = cookie_value(cookies, ACCESS_TOKEN_COOKIE).or_else(|| bearer_token(headers));
    let refresh = cookie_value(cookies, REFRESH_TOKEN_COOKIE);

    if let Some(token) = access {
        match validate_token(&token, &config.supabase_jwt_secret) {
            Ok(identity) => {
                return Some(ResolvedSession {
                    identity,
                    access_token: token,
                    refreshed: None,
                })
            }
            Err(reason) => debug!("Access token rejected: {}", reason),
        }
    }

    let refresh_token = refresh?;
    let client = SupabaseClient::new(config);
    let grant = match client.refresh_grant(&refresh_token).await {
        Ok(grant) => grant,
        Err(e) => {
            debug!("Session refresh failed: {}", e);
            return None;
        }
    };

    match validate_token(&grant.access_token, &config.supabase_jwt_secret) {
        Ok(identity) => Some(ResolvedSession {
            identity,
            access_token: grant.access_token.clone(),
            refreshed: Some(TokenPair {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token.or(Some(refresh_token)),
            }),
        }),
        Err(reason) => {
            debug!("Refreshed access token rejected: {}", reason);
            None
        }
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn apply_session_cookies(cookies: &Cookies, tokens: &TokenPair) {
    cookies.add(session_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone()));
    if let Some(refresh) = &tokens.refresh_token {
        cookies.add(session_cookie(REFRESH_TOKEN_COOKIE, refresh.clone()));
    }
}

pub fn clear_session_cookies(cookies: &Cookies) {
    cookies.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build());
    cookies.remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/").build());
}
