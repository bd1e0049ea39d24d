use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application role. A closed enumeration: every gate decision point
/// matches on this exhaustively, so adding a role is a compile-time-visible
/// change rather than a new string to grep for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    AdminClinical,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::AdminClinical => "admin_clinical",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "doctor" => Some(Role::Doctor),
            "admin_clinical" => Some(Role::AdminClinical),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    /// The landing zone a signed-in user of this role is routed to.
    pub fn home_zone(&self) -> &'static str {
        match self {
            Role::Doctor => "/dashboard",
            Role::AdminClinical => "/admin-clinical",
            Role::Superadmin => "/superadmin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Authenticated principal issued by the hosted auth service. Carries no
/// application role: the role lives on the Profile row and is re-derived
/// from the store on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub issued_at: Option<DateTime<Utc>>,
}

/// Access/refresh token pair as issued by the auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}
