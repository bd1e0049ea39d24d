use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_cookies::CookieManagerLayer;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::router::auth_routes;
use auth_cell::services::SessionStateService;
use auth_cell::AuthPhase;
use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::test_utils::{JwtTestUtils, MockAuthResponses, MockProfileRows, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> (Router, SessionStateService) {
    let config = Arc::new(config);
    let sessions = SessionStateService::new(config.clone());
    let app = Router::new()
        .nest("/auth", auth_routes(config, sessions.clone()))
        .layer(CookieManagerLayer::new());
    (app, sessions)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn login_sets_session_cookies_and_reports_role_home() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::new("doctor@clinic.example");

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockAuthResponses::session_grant(&user, &config.supabase_jwt_secret)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockProfileRows::active(&user.id, Role::Doctor)
        ])))
        .mount(&mock_server)
        .await;

    let (app, sessions) = create_test_app(config);
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": user.email, "password": "correct-horse" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(
        cookies.iter().any(|c| c.starts_with("office-access-token=ey")),
        "expected session cookie, got {:?}",
        cookies
    );
    assert!(cookies.iter().any(|c| c.starts_with("office-refresh-token=")));

    let body = body_json(response).await;
    assert_eq!(body["user_id"], user.id);
    assert_eq!(body["role"], "doctor");
    assert_eq!(body["home_zone"], "/dashboard");
    assert_eq!(body["must_change_password"], false);

    // The login also feeds the mirrored session state.
    assert!(sessions.current().identity.is_some());
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "nobody@clinic.example", "password": "wrong" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn login_of_deactivated_account_is_refused_and_signed_out() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::new("gone@clinic.example");

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockAuthResponses::session_grant(&user, &config.supabase_jwt_secret)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockProfileRows::deactivated(&user.id, Role::AdminClinical)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": user.email, "password": "correct-horse" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Account deactivated");

    mock_server.verify().await;
}

#[tokio::test]
async fn login_without_profile_row_is_refused() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::new("ghost@clinic.example");

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockAuthResponses::session_grant(&user, &config.supabase_jwt_secret)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": user.email, "password": "correct-horse" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_always_succeeds_and_clears_cookies() {
    let (app, sessions) = create_test_app(TestConfig::default().to_app_config());

    // No session at all: still a success.
    let response = app
        .oneshot(post_json("/auth/logout", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("office-access-token=")));
    assert_eq!(sessions.current().phase, AuthPhase::SignedOut);
}

#[tokio::test]
async fn logout_invalidates_the_upstream_session() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header("cookie", format!("office-access-token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock_server.verify().await;
}

#[tokio::test]
async fn session_endpoint_reports_signed_out_without_a_session() {
    let (app, _) = create_test_app(TestConfig::default().to_app_config());

    let request = Request::builder()
        .method("GET")
        .uri("/auth/session")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["phase"], "signed_out");
    assert_eq!(body["identity"], Value::Null);
}

#[tokio::test]
async fn session_endpoint_resolves_identity_and_profile() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::new("admin@clinic.example");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockProfileRows::active(&user.id, Role::AdminClinical)
        ])))
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let request = Request::builder()
        .method("GET")
        .uri("/auth/session")
        .header("cookie", format!("office-access-token={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["phase"], "profile_resolved");
    assert_eq!(body["identity"]["id"], user.id);
    assert_eq!(body["profile"]["role"], "admin_clinical");
}

#[tokio::test]
async fn change_password_updates_credentials_and_clears_the_flag() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::new("admin@clinic.example");
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    Mock::given(method("PUT"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": user.id })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockProfileRows::active(&user.id, Role::AdminClinical)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (app, _) = create_test_app(config);
    let request = Request::builder()
        .method("POST")
        .uri("/auth/change-password")
        .header("cookie", format!("office-access-token={}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "new_password": "a-long-enough-password" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    mock_server.verify().await;
}

#[tokio::test]
async fn change_password_requires_a_session() {
    let (app, _) = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(post_json(
            "/auth/change-password",
            json!({ "new_password": "a-long-enough-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn change_password_rejects_short_passwords() {
    let config = TestConfig::default().to_app_config();
    let user = TestUser::default();
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(24));

    let (app, _) = create_test_app(config);
    let request = Request::builder()
        .method("POST")
        .uri("/auth/change-password")
        .header("cookie", format!("office-access-token={}", token))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "new_password": "short" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_and_account_request_are_permanently_disabled() {
    for uri in ["/auth/signup", "/auth/account-request"] {
        let (app, _) = create_test_app(TestConfig::default().to_app_config());
        let response = app
            .oneshot(post_json(uri, json!({ "email": "new@clinic.example" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri {}", uri);
        let body = body_json(response).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .contains("Self-service signup is disabled"),
            "uri {}",
            uri
        );
    }
}
