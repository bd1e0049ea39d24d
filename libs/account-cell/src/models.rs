use serde::{Deserialize, Serialize};

use shared_models::auth::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub email: String,
    /// Initial credential; the new account starts with
    /// `must_change_password` set and is forced through the change flow on
    /// first sign-in.
    pub temporary_password: String,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub consultation_fee: Option<f64>,
    pub booking_slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivationRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordResetRequest {
    pub temporary_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Role,
}

/// Owner-editable display fields. Role and account-status flags are
/// deliberately absent; those only move through the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMyProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub consultation_fee: Option<f64>,
    pub booking_slug: Option<String>,
}
