use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Role;
use shared_models::profile::Profile;

use crate::models::UpdateMyProfileRequest;

/// Administrator mutations of existing accounts. All of them write through
/// the profile store with last-write-wins semantics; deactivation is soft
/// (profiles are never hard-deleted).
pub struct AccountAdminService {
    supabase: SupabaseClient,
}

impl AccountAdminService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn set_activation(&self, user_id: &str, is_active: bool) -> Result<Profile> {
        debug!("Setting activation for {}: {}", user_id, is_active);

        self.supabase
            .update_profile(
                user_id,
                json!({
                    "is_active": is_active,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await
    }

    /// Reset the account's credential to a temporary password and force the
    /// change flow on next sign-in. The flag is only set once the new
    /// credential is in place.
    pub async fn reset_password(&self, user_id: &str, temporary_password: &str) -> Result<Profile> {
        debug!("Resetting password for {}", user_id);

        self.supabase
            .admin_set_password(user_id, temporary_password)
            .await?;

        self.supabase
            .update_profile(
                user_id,
                json!({
                    "must_change_password": true,
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await
    }

    pub async fn set_role(&self, user_id: &str, role: Role) -> Result<Profile> {
        debug!("Setting role for {}: {}", user_id, role);

        self.supabase
            .update_profile(
                user_id,
                json!({
                    "role": role.as_str(),
                    "updated_at": Utc::now().to_rfc3339()
                }),
            )
            .await
    }

    pub async fn list_accounts(&self) -> Result<Vec<Profile>> {
        self.supabase.list_profiles().await
    }

    pub async fn update_display_fields(
        &self,
        user_id: &str,
        request: UpdateMyProfileRequest,
    ) -> Result<Profile> {
        let mut patch = serde_json::Map::new();

        if let Some(full_name) = request.full_name {
            patch.insert("full_name".to_string(), json!(full_name));
        }
        if let Some(phone) = request.phone {
            patch.insert("phone".to_string(), json!(phone));
        }
        if let Some(specialty) = request.specialty {
            patch.insert("specialty".to_string(), json!(specialty));
        }
        if let Some(fee) = request.consultation_fee {
            patch.insert("consultation_fee".to_string(), json!(fee));
        }
        if let Some(slug) = request.booking_slug {
            patch.insert("booking_slug".to_string(), json!(slug));
        }

        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.supabase
            .update_profile(user_id, serde_json::Value::Object(patch))
            .await
    }
}
