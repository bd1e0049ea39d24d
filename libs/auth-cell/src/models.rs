use serde::{Deserialize, Serialize};

use shared_models::auth::Role;

/// Self-service signup and account requests are permanently disabled;
/// accounts exist only through administrator provisioning.
pub const SIGNUP_DISABLED_MESSAGE: &str =
    "Self-service signup is disabled. Accounts are created by your clinic administrator.";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub role: Role,
    /// Where the client should route after login.
    pub home_zone: String,
    pub must_change_password: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}
