use axum::http::HeaderMap;
use tower_cookies::Cookies;
use tracing::warn;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_models::profile::AuthorizedContext;

use crate::session::authenticate;

fn required_roles_message(allowed: &[Role]) -> String {
    let names: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    format!("Forbidden: {} access required", names.join(" or "))
}

/// Per-endpoint role guard. A pure function of the current session and the
/// stored Profile: exactly one Profile lookup per call, no cache shared
/// across calls.
///
/// No identity resolves to 401; an identity without a Profile, a
/// deactivated account, or a role outside `allowed` resolves to 403 with a
/// message naming the required role(s). A Profile lookup error is
/// fail-closed and treated as "no Profile".
pub async fn verify_role(
    config: &AppConfig,
    cookies: &Cookies,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<AuthorizedContext, AppError> {
    let Some((identity, _access_token)) = authenticate(config, cookies, headers) else {
        return Err(AppError::Auth("Unauthorized".to_string()));
    };

    let client = SupabaseClient::new(config);
    let profile = match client.resolve_profile(&identity.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile lookup failed for {}: {}", identity.id, e);
            None
        }
    };

    let Some(profile) = profile else {
        return Err(AppError::Forbidden(required_roles_message(allowed)));
    };

    if !profile.is_active {
        return Err(AppError::Forbidden("Forbidden: account deactivated".to_string()));
    }

    if !allowed.contains(&profile.role) {
        return Err(AppError::Forbidden(required_roles_message(allowed)));
    }

    Ok(AuthorizedContext {
        identity_id: identity.id,
        profile_id: profile.id,
        role: profile.role,
    })
}
