use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Identity;
use shared_models::profile::Profile;

/// Upper bound on the background profile refinement. A fetch that exceeds
/// this is abandoned and the state advances with `profile = None` rather
/// than leaving consumers in a perpetual loading state.
pub const PROFILE_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Explicit two-phase auth state. `IdentityKnown` is published the moment a
/// session event carries a valid identity, before the profile lookup has
/// finished; `ProfileResolved` follows once the bounded refinement lands.
/// Consumers can rely on the ordering: the loading condition ends at
/// `IdentityKnown`, and profile-dependent views see a none-then-populated
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    SignedOut,
    IdentityKnown,
    ProfileResolved,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
}

impl AuthState {
    pub fn signed_out() -> Self {
        Self {
            phase: AuthPhase::SignedOut,
            identity: None,
            profile: None,
        }
    }

    pub fn identity_known(identity: Identity) -> Self {
        Self {
            phase: AuthPhase::IdentityKnown,
            identity: Some(identity),
            profile: None,
        }
    }

    pub fn profile_resolved(identity: Identity, profile: Option<Profile>) -> Self {
        Self {
            phase: AuthPhase::ProfileResolved,
            identity: Some(identity),
            profile,
        }
    }
}

struct ServiceInner {
    config: Arc<AppConfig>,
    profile_timeout: Duration,
    state: watch::Sender<AuthState>,
    // Monotonic event stamp; a refinement only lands if no newer event
    // arrived while it was in flight.
    generation: AtomicU64,
}

/// Process-wide mirror of the session source, fed by the login/logout
/// handlers. Created once in `main` and torn down with the process.
#[derive(Clone)]
pub struct SessionStateService {
    inner: Arc<ServiceInner>,
}

impl SessionStateService {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self::with_timeout(config, PROFILE_RESOLVE_TIMEOUT)
    }

    pub fn with_timeout(config: Arc<AppConfig>, profile_timeout: Duration) -> Self {
        let (state, _) = watch::channel(AuthState::signed_out());
        Self {
            inner: Arc::new(ServiceInner {
                config,
                profile_timeout,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    pub fn profile_timeout(&self) -> Duration {
        self.inner.profile_timeout
    }

    /// Identity-change notification (login or token refresh). Publishes
    /// `IdentityKnown` immediately, then refines the profile in the
    /// background under the fetch bound.
    pub fn signed_in(&self, identity: Identity) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .state
            .send_replace(AuthState::identity_known(identity.clone()));

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let profile =
                resolve_profile_bounded(&inner.config, &identity.id, inner.profile_timeout).await;
            inner.state.send_modify(|state| {
                // Latest event wins; a stale refinement is dropped.
                if inner.generation.load(Ordering::SeqCst) == generation {
                    *state = AuthState::profile_resolved(identity.clone(), profile.clone());
                }
            });
        });
    }

    pub fn token_refreshed(&self, identity: Identity) {
        self.signed_in(identity);
    }

    /// Unconditional teardown of identity, profile, and loading state.
    pub fn signed_out(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(AuthState::signed_out());
    }
}

/// Profile fetch with an explicit upper bound. Timeout and lookup errors
/// both degrade to `None`: a missing profile is a renderable state, a hung
/// one is not.
pub async fn resolve_profile_bounded(
    config: &AppConfig,
    identity_id: &str,
    bound: Duration,
) -> Option<Profile> {
    let client = SupabaseClient::new(config);
    match tokio::time::timeout(bound, client.resolve_profile(identity_id)).await {
        Ok(Ok(profile)) => profile,
        Ok(Err(e)) => {
            warn!("Profile refinement failed for {}: {}", identity_id, e);
            None
        }
        Err(_) => {
            warn!(
                "Profile refinement for {} timed out after {:?}",
                identity_id, bound
            );
            None
        }
    }
}
