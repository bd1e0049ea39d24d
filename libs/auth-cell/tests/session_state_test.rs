use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::services::session_state::{AuthPhase, SessionStateService};
use shared_models::auth::Role;
use shared_utils::test_utils::{MockProfileRows, TestConfig, TestUser};

async fn mock_profile_lookup_with_delay(server: &MockServer, row: serde_json::Value, delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([row]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn initial_state_is_signed_out() {
    let config = TestConfig::default().to_arc();
    let service = SessionStateService::new(config);

    let state = service.current();
    assert_eq!(state.phase, AuthPhase::SignedOut);
    assert!(state.identity.is_none());
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn identity_is_published_before_the_profile_resolves() {
    let mock_server = MockServer::start().await;
    let user = TestUser::new("doctor@clinic.example");
    mock_profile_lookup_with_delay(
        &mock_server,
        MockProfileRows::active(&user.id, Role::Doctor),
        Duration::from_millis(100),
    )
    .await;

    let config = Arc::new(TestConfig::with_url(&mock_server.uri()));
    let service = SessionStateService::new(config);
    let mut rx = service.subscribe();

    service.signed_in(user.to_identity());

    // Phase one lands immediately: identity known, profile still pending.
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.phase, AuthPhase::IdentityKnown);
    assert_eq!(state.identity.as_ref().map(|i| i.id.clone()), Some(user.id.clone()));
    assert!(state.profile.is_none());

    // Phase two follows with the resolved profile.
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.phase, AuthPhase::ProfileResolved);
    let profile = state.profile.expect("profile should have resolved");
    assert_eq!(profile.role, Role::Doctor);
}

#[tokio::test]
async fn slow_profile_fetch_is_abandoned_at_the_bound() {
    let mock_server = MockServer::start().await;
    let user = TestUser::default();
    mock_profile_lookup_with_delay(
        &mock_server,
        MockProfileRows::active(&user.id, Role::Doctor),
        Duration::from_millis(500),
    )
    .await;

    let config = Arc::new(TestConfig::with_url(&mock_server.uri()));
    let service = SessionStateService::with_timeout(config, Duration::from_millis(50));
    let mut rx = service.subscribe();

    service.signed_in(user.to_identity());

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().phase, AuthPhase::IdentityKnown);

    // The state still advances; the profile is simply absent.
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.phase, AuthPhase::ProfileResolved);
    assert!(state.identity.is_some());
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn profile_lookup_error_degrades_to_none() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = Arc::new(TestConfig::with_url(&mock_server.uri()));
    let service = SessionStateService::new(config);
    let mut rx = service.subscribe();

    let user = TestUser::default();
    service.signed_in(user.to_identity());

    rx.changed().await.unwrap();
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert_eq!(state.phase, AuthPhase::ProfileResolved);
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn sign_out_wins_over_an_in_flight_refinement() {
    let mock_server = MockServer::start().await;
    let user = TestUser::default();
    mock_profile_lookup_with_delay(
        &mock_server,
        MockProfileRows::active(&user.id, Role::Doctor),
        Duration::from_millis(200),
    )
    .await;

    let config = Arc::new(TestConfig::with_url(&mock_server.uri()));
    let service = SessionStateService::new(config);

    service.signed_in(user.to_identity());
    service.signed_out();

    // Give the abandoned refinement time to land, had it been allowed to.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = service.current();
    assert_eq!(state.phase, AuthPhase::SignedOut);
    assert!(state.identity.is_none());
    assert!(state.profile.is_none());
}

#[tokio::test]
async fn newer_sign_in_wins_over_an_older_refinement() {
    let mock_server = MockServer::start().await;
    let first = TestUser::new("first@clinic.example");
    let second = TestUser::new("second@clinic.example");
    mock_profile_lookup_with_delay(
        &mock_server,
        MockProfileRows::active(&second.id, Role::AdminClinical),
        Duration::from_millis(100),
    )
    .await;

    let config = Arc::new(TestConfig::with_url(&mock_server.uri()));
    let service = SessionStateService::new(config);

    service.signed_in(first.to_identity());
    service.signed_in(second.to_identity());

    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = service.current();
    assert_eq!(state.phase, AuthPhase::ProfileResolved);
    assert_eq!(
        state.identity.as_ref().map(|i| i.id.clone()),
        Some(second.id.clone())
    );
}
