use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Identity, Role};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> AppConfig {
        let mut config = Self::default().to_app_config();
        config.supabase_url = url.to_string();
        config
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        }
    }

    pub fn to_identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            metadata: None,
            issued_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "aud": "authenticated",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockProfileRows;

impl MockProfileRows {
    pub fn active(user_id: &str, role: Role) -> Value {
        Self::row(user_id, role, true, false)
    }

    pub fn deactivated(user_id: &str, role: Role) -> Value {
        Self::row(user_id, role, false, false)
    }

    pub fn must_change_password(user_id: &str, role: Role) -> Value {
        Self::row(user_id, role, true, true)
    }

    pub fn row(user_id: &str, role: Role, is_active: bool, must_change_password: bool) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "role": role.as_str(),
            "is_active": is_active,
            "must_change_password": must_change_password,
            "full_name": "Test User",
            "email": "test@example.com",
            "phone": null,
            "specialty": if role == Role::Doctor { json!("General Practice") } else { json!(null) },
            "consultation_fee": if role == Role::Doctor { json!(60.0) } else { json!(null) },
            "booking_slug": if role == Role::Doctor { json!("test-user") } else { json!(null) },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }
}

pub struct MockAuthResponses;

impl MockAuthResponses {
    /// Grant body whose access token actually validates against `secret`.
    pub fn session_grant(user: &TestUser, secret: &str) -> Value {
        json!({
            "access_token": JwtTestUtils::create_test_token(user, secret, Some(1)),
            "refresh_token": "test-refresh-token",
            "token_type": "bearer",
            "expires_in": 3600
        })
    }

    pub fn admin_user(user: &TestUser) -> Value {
        json!({
            "id": user.id,
            "email": user.email,
            "email_confirmed_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}
