use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_cookies::Cookies;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::TokenPair;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;
use shared_utils::session::{
    apply_session_cookies, authenticate, clear_session_cookies, CurrentSession,
};

use crate::models::{ChangePasswordRequest, LoginRequest, LoginResponse, SIGNUP_DISABLED_MESSAGE};
use crate::services::session_state::{resolve_profile_bounded, AuthState, SessionStateService};

#[derive(Clone)]
pub struct AuthCellState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionStateService,
}

pub async fn login(
    State(state): State<AuthCellState>,
    cookies: Cookies,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    debug!("Login attempt for {}", request.email);

    let client = SupabaseClient::new(&state.config);
    let grant = client
        .password_grant(&request.email, &request.password)
        .await
        .map_err(|_| AppError::Auth("Invalid email or password".to_string()))?;

    let identity = validate_token(&grant.access_token, &state.config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    // The role is never taken from the token: one profile lookup decides it.
    let profile = match client.resolve_profile(&identity.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile lookup failed for {}: {}", identity.id, e);
            None
        }
    };

    let Some(profile) = profile else {
        // Credentials without a profile row: unknown account, no session.
        if let Err(e) = client.sign_out(&grant.access_token).await {
            warn!("Sign-out of unknown account failed: {}", e);
        }
        return Err(AppError::Forbidden(
            "No account profile exists for this login".to_string(),
        ));
    };

    if !profile.is_active {
        if let Err(e) = client.sign_out(&grant.access_token).await {
            warn!("Sign-out of deactivated account failed: {}", e);
        }
        return Err(AppError::Forbidden("Account deactivated".to_string()));
    }

    apply_session_cookies(
        &cookies,
        &TokenPair {
            access_token: grant.access_token.clone(),
            refresh_token: grant.refresh_token.clone(),
        },
    );
    state.sessions.signed_in(identity.clone());

    Ok(Json(LoginResponse {
        user_id: identity.id,
        email: identity.email,
        role: profile.role,
        home_zone: profile.role.home_zone().to_string(),
        must_change_password: profile.must_change_password,
    }))
}

/// Sign-out always succeeds from the caller's view: the upstream logout is
/// best-effort, the cookie and state teardown are not.
pub async fn logout(
    State(state): State<AuthCellState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Json<Value> {
    if let Some((identity, access_token)) = authenticate(&state.config, &cookies, &headers) {
        debug!("Signing out {}", identity.id);
        let client = SupabaseClient::new(&state.config);
        if let Err(e) = client.sign_out(&access_token).await {
            warn!("Upstream sign-out failed: {}", e);
        }
    }

    clear_session_cookies(&cookies);
    state.sessions.signed_out();

    Json(json!({ "success": true }))
}

/// Session snapshot for client bootstrap. Identity is answered from the
/// token alone; the profile refinement shares the session state service's
/// fetch bound, so a slow store degrades to `profile: null` instead of a
/// hanging response.
pub async fn session(
    State(state): State<AuthCellState>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Json<AuthState> {
    let Some((identity, _access_token)) = authenticate(&state.config, &cookies, &headers) else {
        return Json(AuthState::signed_out());
    };

    let profile = resolve_profile_bounded(
        &state.config,
        &identity.id,
        state.sessions.profile_timeout(),
    )
    .await;

    Json(AuthState::profile_resolved(identity, profile))
}

pub async fn change_password(
    State(state): State<AuthCellState>,
    Extension(session): Extension<CurrentSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    if request.new_password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    let client = SupabaseClient::new(&state.config);
    client
        .update_own_password(&session.access_token, &request.new_password)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    // The forced-change flag only clears once the new password is in place.
    client
        .update_profile(
            &session.identity.id,
            json!({
                "must_change_password": false,
                "updated_at": Utc::now().to_rfc3339()
            }),
        )
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    state.sessions.signed_in(session.identity.clone());

    Ok(Json(json!({ "success": true })))
}

pub async fn signup_disabled() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": SIGNUP_DISABLED_MESSAGE })),
    )
}

pub async fn account_request_disabled() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": SIGNUP_DISABLED_MESSAGE })),
    )
}
