use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

/// Application-owned record mapping an Identity to a role and account-status
/// flags. At most one row per identity; absence of a row is the
/// unauthorized/unknown-account state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    pub is_active: bool,
    pub must_change_password: bool,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub consultation_fee: Option<f64>,
    pub booking_slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a successful role-guard check: the identity behind the session,
/// the profile row it maps to, and the role that satisfied the guard.
#[derive(Debug, Clone)]
pub struct AuthorizedContext {
    pub identity_id: String,
    pub profile_id: Uuid,
    pub role: Role,
}
