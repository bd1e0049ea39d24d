use shared_models::auth::{Identity, Role};
use shared_models::profile::Profile;

use crate::zone::{classify, PathZone, CHANGE_PASSWORD_PATH, DEACTIVATED_REDIRECT, LOGIN_PATH};

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    ToLogin,
    /// Redirect to login with the deactivation reason. Carries a mandatory
    /// side effect: the session must be invalidated as part of the redirect.
    ToLoginDeactivated,
    ToChangePassword,
    /// Bounce to the home zone of the caller's role.
    ToRoleHome(&'static str),
}

impl GateDecision {
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::ToLogin => Some(LOGIN_PATH),
            GateDecision::ToLoginDeactivated => Some(DEACTIVATED_REDIRECT),
            GateDecision::ToChangePassword => Some(CHANGE_PASSWORD_PATH),
            GateDecision::ToRoleHome(home) => Some(home),
        }
    }
}

/// The gate's routing rules, evaluated in strict order. Pure: session and
/// profile resolution (and their failure handling) happen in the caller;
/// a resolution failure arrives here as `None` and fails closed.
pub fn decide(
    identity: Option<&Identity>,
    profile: Option<&Profile>,
    path: &str,
) -> GateDecision {
    let zone = classify(path);

    // 1. Unauthenticated traffic may only reach auth pages and public
    // paths. An identity that maps to no Profile row is an unknown account
    // and is routed the same way.
    let unauthenticated = match zone {
        PathZone::Auth | PathZone::ChangePassword | PathZone::Public | PathZone::Api => {
            GateDecision::Allow
        }
        PathZone::Superadmin | PathZone::AdminClinical | PathZone::App => GateDecision::ToLogin,
    };
    if identity.is_none() {
        return unauthenticated;
    }
    let Some(profile) = profile else {
        return unauthenticated;
    };

    // 3.-4. Account-status flags dominate all role-based routing.
    let on_auth_family = matches!(zone, PathZone::Auth | PathZone::ChangePassword);
    if !profile.is_active && !on_auth_family {
        return GateDecision::ToLoginDeactivated;
    }
    if profile.must_change_password && zone != PathZone::ChangePassword {
        return GateDecision::ToChangePassword;
    }

    // 5. A signed-in user has no business on the auth pages.
    let role_home = profile.role.home_zone();
    if zone == PathZone::Auth {
        return GateDecision::ToRoleHome(role_home);
    }

    // 6.-7. Role zones bounce outsiders to their own home.
    match zone {
        PathZone::Superadmin => match profile.role {
            Role::Superadmin => GateDecision::Allow,
            Role::AdminClinical | Role::Doctor => GateDecision::ToRoleHome(role_home),
        },
        PathZone::AdminClinical => match profile.role {
            Role::AdminClinical => GateDecision::Allow,
            Role::Superadmin | Role::Doctor => GateDecision::ToRoleHome(role_home),
        },
        PathZone::Auth
        | PathZone::ChangePassword
        | PathZone::Public
        | PathZone::Api
        | PathZone::App => GateDecision::Allow,
    }
}
