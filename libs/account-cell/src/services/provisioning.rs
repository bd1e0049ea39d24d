use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::Profile;

use crate::models::CreateAccountRequest;

/// Account creation across two external systems with no shared transaction:
/// the auth service owns the Identity, the profile store owns the Profile.
/// The saga creates the Identity first, then the Profile, and compensates a
/// Profile failure by deleting the Identity so no orphan login survives.
pub struct ProvisioningService {
    supabase: SupabaseClient,
}

impl ProvisioningService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn create_account(&self, request: CreateAccountRequest) -> Result<Profile> {
        debug!("Provisioning {} account for {}", request.role, request.email);

        let identity = self
            .supabase
            .admin_create_user(&request.email, &request.temporary_password)
            .await
            .map_err(|e| anyhow!("Identity creation failed: {}", e))?;

        let row = json!({
            "user_id": identity.id,
            "role": request.role.as_str(),
            "is_active": true,
            "must_change_password": true,
            "full_name": request.full_name,
            "email": request.email,
            "phone": request.phone,
            "specialty": request.specialty,
            "consultation_fee": request.consultation_fee,
            "booking_slug": request.booking_slug,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        match self.supabase.insert_profile(row).await {
            Ok(profile) => {
                debug!("Account provisioned: profile {} for identity {}", profile.id, identity.id);
                Ok(profile)
            }
            Err(profile_err) => {
                // Compensation runs before the error surfaces, always.
                self.rollback_identity(Some(&identity.id)).await;
                Err(anyhow!("Profile creation failed: {}", profile_err))
            }
        }
    }

    /// Compensating cleanup, idempotent by construction: a `None` id (the
    /// Identity was never created) is a no-op and an already-deleted
    /// Identity counts as deleted. A delete that still fails is logged for
    /// out-of-band reconciliation rather than masking the primary error.
    pub async fn rollback_identity(&self, identity_id: Option<&str>) {
        let Some(id) = identity_id else {
            return;
        };

        match self.supabase.admin_delete_user(id).await {
            Ok(()) => debug!("Rolled back identity {}", id),
            Err(e) => error!("Orphan identity {} could not be deleted: {}", id, e),
        }
    }
}
