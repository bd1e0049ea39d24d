use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::profile::Profile;

/// Token grant issued by the auth service for password and refresh-token
/// grants.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Identity record returned by the auth admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: Option<String>,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap_or_else(|_| HeaderValue::from_static("")));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    fn service_key(&self) -> &str {
        &self.service_role_key
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fire a request where the response body does not matter (sign-out,
    /// admin password updates return 200/204 with uninteresting bodies).
    pub async fn execute(&self, method: Method, path: &str,
                         auth_token: Option<&str>, body: Option<Value>) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(auth_token));

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(anyhow!("API error ({}): {}", status, error_text));
        }

        Ok(())
    }

    // ---- auth service: session grants ----

    pub async fn password_grant(&self, email: &str, password: &str) -> Result<SessionGrant> {
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({ "email": email, "password": password })),
        ).await
    }

    pub async fn refresh_grant(&self, refresh_token: &str) -> Result<SessionGrant> {
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=refresh_token",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        ).await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.execute(Method::POST, "/auth/v1/logout", Some(access_token), None).await
    }

    /// Change the password of the session's own user.
    pub async fn update_own_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        self.execute(
            Method::PUT,
            "/auth/v1/user",
            Some(access_token),
            Some(json!({ "password": new_password })),
        ).await
    }

    // ---- auth service: admin API (service role key) ----

    pub async fn admin_create_user(&self, email: &str, password: &str) -> Result<AdminUser> {
        self.request(
            Method::POST,
            "/auth/v1/admin/users",
            Some(self.service_key()),
            Some(json!({
                "email": email,
                "password": password,
                "email_confirm": true
            })),
        ).await
    }

    /// Delete an identity. Idempotent: a 404 (already deleted, or never
    /// created) is success, so compensating cleanup can call this blindly.
    pub async fn admin_delete_user(&self, user_id: &str) -> Result<()> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, user_id);
        debug!("Deleting identity {}", user_id);

        let response = self.client.delete(&url)
            .headers(self.get_headers(Some(self.service_key())))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let error_text = response.text().await?;
        error!("Identity delete failed ({}): {}", status, error_text);
        Err(anyhow!("Identity delete failed ({}): {}", status, error_text))
    }

    pub async fn admin_set_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        self.execute(
            Method::PUT,
            &format!("/auth/v1/admin/users/{}", user_id),
            Some(self.service_key()),
            Some(json!({ "password": new_password })),
        ).await
    }

    // ---- profile store ----

    /// Resolve the Profile for an identity. Single point of truth for the
    /// gate, the session state service, and the API guards: exactly one
    /// lookup by user_id, no caching, no retries. Zero rows is Ok(None).
    /// A row whose role is not a known enumeration value fails closed to
    /// Ok(None) as well.
    pub async fn resolve_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let path = format!("/rest/v1/profiles?user_id=eq.{}&limit=1", user_id);

        let rows: Vec<Value> = self.request(
            Method::GET,
            &path,
            Some(self.service_key()),
            None,
        ).await?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        match serde_json::from_value::<Profile>(row) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!("Unparseable profile row for user {}: {}", user_id, e);
                Ok(None)
            }
        }
    }

    pub async fn insert_profile(&self, row: Value) -> Result<Profile> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.request_with_headers(
            Method::POST,
            "/rest/v1/profiles",
            Some(self.service_key()),
            Some(row),
            Some(headers),
        ).await?;

        let Some(inserted) = result.into_iter().next() else {
            return Err(anyhow!("Profile insert returned no row"));
        };

        Ok(serde_json::from_value(inserted)?)
    }

    pub async fn update_profile(&self, user_id: &str, patch: Value) -> Result<Profile> {
        let path = format!("/rest/v1/profiles?user_id=eq.{}", user_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.request_with_headers(
            Method::PATCH,
            &path,
            Some(self.service_key()),
            Some(patch),
            Some(headers),
        ).await?;

        let Some(updated) = result.into_iter().next() else {
            return Err(anyhow!("Profile not found for user {}", user_id));
        };

        Ok(serde_json::from_value(updated)?)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows: Vec<Value> = self.request(
            Method::GET,
            "/rest/v1/profiles?order=created_at.asc",
            Some(self.service_key()),
            None,
        ).await?;

        let profiles = rows.into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<Profile>, _>>()?;

        Ok(profiles)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
