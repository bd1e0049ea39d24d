/// Redirect targets forming the external contract of the gate.
pub const LOGIN_PATH: &str = "/login";
pub const DEACTIVATED_REDIRECT: &str = "/login?error=account_deactivated";
pub const CHANGE_PASSWORD_PATH: &str = "/change-password";

/// Auth-family pages. The change-password page is deliberately not in this
/// list: it shares the family for reachability checks but is excluded from
/// the signed-in auth-page bounce, so it gets its own zone.
const AUTH_PAGES: &[&str] = &["/login", "/signup", "/forgot-password", "/account-request"];

/// Whitelisted public paths reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/", "/api/health"];
const PUBLIC_PREFIXES: &[&str] = &["/book"];

/// API prefixes are never gated; the per-route guards own them.
const API_PREFIXES: &[&str] = &["/auth", "/accounts"];

const SUPERADMIN_PREFIX: &str = "/superadmin";
const ADMIN_CLINICAL_PREFIX: &str = "/admin-clinical";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathZone {
    /// Login/signup family pages.
    Auth,
    /// The forced password-change page.
    ChangePassword,
    /// Whitelisted public paths (landing page, public booking links).
    Public,
    /// API routes, gated by their own per-route guards.
    Api,
    /// Pages requiring the superadmin role.
    Superadmin,
    /// Pages requiring the admin_clinical role.
    AdminClinical,
    /// Everything else: the default signed-in application zone.
    App,
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{}/", prefix))
}

pub fn classify(path: &str) -> PathZone {
    if API_PREFIXES.iter().any(|p| under(path, p)) {
        return PathZone::Api;
    }
    if under(path, CHANGE_PASSWORD_PATH) {
        return PathZone::ChangePassword;
    }
    if AUTH_PAGES.iter().any(|p| under(path, p)) {
        return PathZone::Auth;
    }
    if PUBLIC_PATHS.contains(&path) || PUBLIC_PREFIXES.iter().any(|p| under(path, p)) {
        return PathZone::Public;
    }
    if under(path, SUPERADMIN_PREFIX) {
        return PathZone::Superadmin;
    }
    if under(path, ADMIN_CLINICAL_PREFIX) {
        return PathZone::AdminClinical;
    }
    PathZone::App
}
