use axum::{extract::Path, Json};
use serde_json::{json, Value};

// Page endpoints. The actual UI is rendered by the web client; these
// markers exist so the gate has real routes to sit in front of and so
// integration tests can tell pass-through from redirect.

pub async fn landing_page() -> &'static str {
    "Clinic Office gateway is running!"
}

pub async fn login_page() -> Json<Value> {
    Json(json!({ "page": "login" }))
}

pub async fn signup_page() -> Json<Value> {
    Json(json!({ "page": "signup" }))
}

pub async fn forgot_password_page() -> Json<Value> {
    Json(json!({ "page": "forgot-password" }))
}

pub async fn account_request_page() -> Json<Value> {
    Json(json!({ "page": "account-request" }))
}

pub async fn change_password_page() -> Json<Value> {
    Json(json!({ "page": "change-password" }))
}

pub async fn dashboard_page() -> Json<Value> {
    Json(json!({ "page": "dashboard" }))
}

pub async fn superadmin_page() -> Json<Value> {
    Json(json!({ "page": "superadmin" }))
}

pub async fn admin_clinical_page() -> Json<Value> {
    Json(json!({ "page": "admin-clinical" }))
}

pub async fn public_booking_page(Path(slug): Path<String>) -> Json<Value> {
    Json(json!({ "page": "book", "slug": slug }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
