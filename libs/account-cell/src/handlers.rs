use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tower_cookies::Cookies;

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::guard::verify_role;

use crate::models::{
    ActivationRequest, CreateAccountRequest, PasswordResetRequest, RoleUpdateRequest,
    UpdateMyProfileRequest,
};
use crate::services::{AccountAdminService, ProvisioningService};

fn validate_new_account(request: &CreateAccountRequest) -> Result<(), AppError> {
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(AppError::ValidationError("A valid email is required".to_string()));
    }
    if request.temporary_password.len() < 8 {
        return Err(AppError::ValidationError(
            "Temporary password must be at least 8 characters long".to_string(),
        ));
    }
    if request.full_name.trim().is_empty() {
        return Err(AppError::ValidationError("Full name is required".to_string()));
    }
    Ok(())
}

pub async fn create_account(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
    Json(request): Json<CreateAccountRequest>,
) -> Result<Json<Value>, AppError> {
    let ctx = verify_role(
        &config,
        &cookies,
        &headers,
        &[Role::Superadmin, Role::AdminClinical],
    )
    .await?;

    // Clinic admins provision doctors; anything above that is superadmin
    // territory.
    if request.role != Role::Doctor && ctx.role != Role::Superadmin {
        return Err(AppError::Forbidden(
            "Forbidden: superadmin access required".to_string(),
        ));
    }

    validate_new_account(&request)?;

    let service = ProvisioningService::new(&config);
    let profile = service
        .create_account(request)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(profile)))
}

pub async fn list_accounts(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    verify_role(
        &config,
        &cookies,
        &headers,
        &[Role::Superadmin, Role::AdminClinical],
    )
    .await?;

    let service = AccountAdminService::new(&config);
    let accounts = service
        .list_accounts()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!({
        "accounts": accounts,
        "total": accounts.len()
    })))
}

pub async fn set_activation(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<ActivationRequest>,
) -> Result<Json<Value>, AppError> {
    verify_role(&config, &cookies, &headers, &[Role::Superadmin]).await?;

    let service = AccountAdminService::new(&config);
    let profile = service
        .set_activation(&user_id, request.is_active)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(profile)))
}

pub async fn reset_password(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<Value>, AppError> {
    verify_role(
        &config,
        &cookies,
        &headers,
        &[Role::Superadmin, Role::AdminClinical],
    )
    .await?;

    if request.temporary_password.len() < 8 {
        return Err(AppError::ValidationError(
            "Temporary password must be at least 8 characters long".to_string(),
        ));
    }

    let service = AccountAdminService::new(&config);
    let profile = service
        .reset_password(&user_id, &request.temporary_password)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!(profile)))
}

pub async fn set_role(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<RoleUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    verify_role(&config, &cookies, &headers, &[Role::Superadmin]).await?;

    let service = AccountAdminService::new(&config);
    let profile = service
        .set_role(&user_id, request.role)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(profile)))
}

pub async fn update_my_profile(
    State(config): State<Arc<AppConfig>>,
    cookies: Cookies,
    headers: HeaderMap,
    Json(request): Json<UpdateMyProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let ctx = verify_role(
        &config,
        &cookies,
        &headers,
        &[Role::Doctor, Role::AdminClinical, Role::Superadmin],
    )
    .await?;

    let service = AccountAdminService::new(&config);
    let profile = service
        .update_display_fields(&ctx.identity_id, request)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(json!(profile)))
}
