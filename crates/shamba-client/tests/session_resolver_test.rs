use async_trait::async_trait;
use shamba_client::api::{ApiError, Endpoint, MockMarketApi};
use shamba_client::auth::{
    AuthError, AuthEvent, AuthProvider, AuthSubscription, LocalAuthProvider,
};
use shamba_client::clients::SessionClient;
use shamba_client::model::{ProfileDetails, Role, Session, SessionTokens, UserProfile};
use shamba_actor::ActorClient;
use shamba_client::session_actor::{
    self, Resolution, SessionContext, FALLBACK_ADVISORY, SESSION_UNAVAILABLE,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

const DEADLINE: Duration = Duration::from_secs(3);

fn session(id: &str) -> Session {
    Session::new(id, format!("{id}@example.com"), format!("jwt-{id}"))
        .with_role("SUPPLIER")
        .with_full_name(format!("Farmer {id}"))
}

fn profile(id: &str) -> UserProfile {
    UserProfile {
        id: format!("mongo-{id}"),
        email: format!("{id}@example.com"),
        supabase_user_id: Some(id.to_string()),
        role: Role::Supplier,
        profile: ProfileDetails {
            name: format!("Farmer {id}"),
        },
        transaction_volume: 12500.0,
        verified_reserve_value: 3000.0,
        fallback: false,
    }
}

fn start(auth: impl AuthProvider + 'static, api: &MockMarketApi) -> SessionClient {
    let (actor, client) = session_actor::new(DEADLINE);
    tokio::spawn(actor.run(SessionContext {
        auth: Arc::new(auth),
        api: Arc::new(api.clone()),
    }));
    client
}

/// Provider whose session lookup always fails.
struct BrokenProvider;

#[async_trait]
impl AuthProvider for BrokenProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Err(AuthError::Provider("storage unavailable".to_string()))
    }

    async fn set_session(&self, _tokens: SessionTokens) -> Result<Session, AuthError> {
        Err(AuthError::NoSession)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        let (_sender, receiver) = mpsc::unbounded_channel();
        AuthSubscription::new(receiver, || {})
    }
}

#[tokio::test(start_paused = true)]
async fn test_initialize_resolves_backend_profile() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    assert_eq!(client.initialize().await, Ok(Resolution::Fetching));
    let settled = client.wait_until_settled().await.unwrap();

    assert_eq!(settled.profile, Some(profile("u1")));
    assert_eq!(settled.session, Some(session("u1")));
    assert_eq!(settled.error, None);
    assert!(!settled.is_degraded());
    api.verify();
}

#[tokio::test(start_paused = true)]
async fn test_hanging_fetch_falls_back_after_exactly_the_deadline() {
    let api = MockMarketApi::new();
    api.expect_get_me().never_resolve();
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    let started = Instant::now();
    client.initialize().await.unwrap();
    let settled = client.wait_until_settled().await.unwrap();

    assert_eq!(started.elapsed(), DEADLINE);
    assert!(!settled.loading);
    assert_eq!(settled.error.as_deref(), Some(FALLBACK_ADVISORY));

    let fallback = settled.profile.unwrap();
    assert!(fallback.fallback);
    assert_eq!(fallback.id, "u1");
    assert_eq!(fallback.role, Role::Supplier);
    assert_eq!(fallback.display_name(), "Farmer u1");
    assert_eq!(fallback.transaction_volume, 0.0);
}

#[tokio::test(start_paused = true)]
async fn test_backend_error_falls_back_immediately() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_err(ApiError::Server { status: 500 });
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    let started = Instant::now();
    client.initialize().await.unwrap();
    let settled = client.wait_until_settled().await.unwrap();

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert!(settled.is_degraded());
    assert_eq!(settled.error.as_deref(), Some(FALLBACK_ADVISORY));
}

#[tokio::test]
async fn test_initialize_without_session_clears() {
    let api = MockMarketApi::new();
    let client = start(LocalAuthProvider::new(), &api);

    assert_eq!(client.initialize().await, Ok(Resolution::Cleared));
    let snapshot = client.snapshot().await.unwrap();

    assert!(!snapshot.loading);
    assert_eq!(snapshot.profile, None);
    assert_eq!(snapshot.error, None);
    assert_eq!(api.call_count(Endpoint::GetMe), 0);
}

#[tokio::test]
async fn test_provider_failure_reports_advisory() {
    let api = MockMarketApi::new();
    let client = start(BrokenProvider, &api);

    assert_eq!(
        client.initialize().await,
        Ok(Resolution::SessionUnavailable)
    );
    let snapshot = client.snapshot().await.unwrap();

    assert!(!snapshot.loading);
    assert_eq!(snapshot.profile, None);
    assert_eq!(snapshot.error.as_deref(), Some(SESSION_UNAVAILABLE));
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_resolve_while_in_flight_is_skipped() {
    let api = MockMarketApi::new();
    api.expect_get_me()
        .return_ok_after(Duration::from_secs(1), profile("u1"));
    let client = start(LocalAuthProvider::new(), &api);

    assert_eq!(
        client.resolve(Some(session("u1"))).await,
        Ok(Resolution::Fetching)
    );
    assert_eq!(
        client.resolve(Some(session("u1"))).await,
        Ok(Resolution::Skipped)
    );

    let settled = client.wait_until_settled().await.unwrap();
    assert_eq!(settled.profile, Some(profile("u1")));
    assert_eq!(api.call_count(Endpoint::GetMe), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_identity_supersedes_in_flight_fetch() {
    let api = MockMarketApi::new();
    api.expect_get_me()
        .return_ok_after(Duration::from_secs(5), profile("u1"));
    api.expect_get_me().return_ok(profile("u2"));
    let client = start(LocalAuthProvider::new(), &api);

    client.resolve(Some(session("u1"))).await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        client.resolve(Some(session("u2"))).await,
        Ok(Resolution::Fetching)
    );

    let settled = client.wait_until_settled().await.unwrap();
    assert_eq!(settled.profile, Some(profile("u2")));

    // The superseded fetch never lands.
    sleep(Duration::from_secs(10)).await;
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.profile, Some(profile("u2")));
    assert_eq!(snapshot.session, Some(session("u2")));
}

#[tokio::test(start_paused = true)]
async fn test_repeated_sign_in_for_same_identity_is_ignored() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    let client = start(LocalAuthProvider::new(), &api);

    assert_eq!(
        client.notify(AuthEvent::SignedIn(session("u1"))).await,
        Ok(Resolution::Fetching)
    );
    client.wait_until_settled().await.unwrap();
    assert_eq!(
        client.notify(AuthEvent::SignedIn(session("u1"))).await,
        Ok(Resolution::Skipped)
    );

    sleep(Duration::from_secs(5)).await;
    assert_eq!(api.call_count(Endpoint::GetMe), 1);
    api.verify();
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_discards_in_flight_fetch() {
    let api = MockMarketApi::new();
    api.expect_get_me()
        .return_ok_after(Duration::from_secs(2), profile("u1"));
    let client = start(LocalAuthProvider::new(), &api);

    client
        .notify(AuthEvent::SignedIn(session("u1")))
        .await
        .unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(
        client.notify(AuthEvent::SignedOut).await,
        Ok(Resolution::Cleared)
    );

    sleep(Duration::from_secs(5)).await;
    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.session, None);
    assert_eq!(snapshot.profile, None);
    assert_eq!(snapshot.error, None);
    assert!(!snapshot.loading);
}

#[tokio::test(start_paused = true)]
async fn test_sign_in_after_sign_out_fetches_again() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    api.expect_get_me().return_ok(profile("u1"));
    let client = start(LocalAuthProvider::new(), &api);

    client.notify(AuthEvent::SignedIn(session("u1"))).await.unwrap();
    client.wait_until_settled().await.unwrap();
    client.notify(AuthEvent::SignedOut).await.unwrap();

    assert_eq!(
        client.notify(AuthEvent::SignedIn(session("u1"))).await,
        Ok(Resolution::Fetching)
    );
    let settled = client.wait_until_settled().await.unwrap();
    assert_eq!(settled.profile, Some(profile("u1")));
    api.verify();
}

#[tokio::test(start_paused = true)]
async fn test_token_refresh_only_fetches_without_profile() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    let client = start(LocalAuthProvider::new(), &api);

    assert_eq!(
        client
            .notify(AuthEvent::TokenRefreshed(session("u1")))
            .await,
        Ok(Resolution::Fetching)
    );
    client.wait_until_settled().await.unwrap();

    let mut refreshed = session("u1");
    refreshed.access_token = "jwt-rotated".to_string();
    assert_eq!(
        client
            .notify(AuthEvent::TokenRefreshed(refreshed.clone()))
            .await,
        Ok(Resolution::Unchanged)
    );

    let snapshot = client.snapshot().await.unwrap();
    assert_eq!(snapshot.session, Some(refreshed));
    assert_eq!(snapshot.profile, Some(profile("u1")));
    assert_eq!(api.call_count(Endpoint::GetMe), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refetch_keeps_fetched_profile() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    api.expect_get_me().never_resolve();
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    client.initialize().await.unwrap();
    client.wait_until_settled().await.unwrap();

    assert_eq!(client.refetch().await, Ok(Resolution::Fetching));
    assert!(client.snapshot().await.unwrap().loading);
    let settled = client.wait_until_settled().await.unwrap();

    assert_eq!(settled.profile, Some(profile("u1")));
    assert_eq!(settled.error.as_deref(), Some(FALLBACK_ADVISORY));
}

#[tokio::test(start_paused = true)]
async fn test_failed_refetch_keeps_profile_without_provider_id() {
    let fetched = UserProfile {
        supabase_user_id: None,
        ..profile("u1")
    };
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(fetched.clone());
    api.expect_get_me().never_resolve();
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    client.initialize().await.unwrap();
    assert_eq!(
        client.wait_until_settled().await.unwrap().profile,
        Some(fetched.clone())
    );

    client.refetch().await.unwrap();
    let settled = client.wait_until_settled().await.unwrap();

    assert_eq!(settled.profile, Some(fetched));
    assert_eq!(settled.error.as_deref(), Some(FALLBACK_ADVISORY));
}

#[tokio::test(start_paused = true)]
async fn test_failed_fetch_for_new_identity_does_not_keep_old_profile() {
    let api = MockMarketApi::new();
    api.expect_get_me().return_ok(profile("u1"));
    api.expect_get_me().return_err(ApiError::Server { status: 502 });
    let auth = LocalAuthProvider::with_session(session("u1"));
    let client = start(auth, &api);

    client.initialize().await.unwrap();
    client.wait_until_settled().await.unwrap();

    client
        .notify(AuthEvent::SignedIn(session("u2")))
        .await
        .unwrap();
    let settled = client.wait_until_settled().await.unwrap();

    let held = settled.profile.unwrap();
    assert!(held.fallback);
    assert_eq!(held.id, "u2");
}

#[tokio::test(start_paused = true)]
async fn test_refetch_replaces_in_flight_fetch() {
    let api = MockMarketApi::new();
    api.expect_get_me()
        .return_ok_after(Duration::from_secs(2), profile("u1"));
    let mut updated = profile("u1");
    updated.transaction_volume = 99000.0;
    api.expect_get_me().return_ok(updated.clone());
    let client = start(LocalAuthProvider::with_session(session("u1")), &api);

    client.initialize().await.unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(client.refetch().await, Ok(Resolution::Fetching));

    let settled = client.wait_until_settled().await.unwrap();
    assert_eq!(settled.profile, Some(updated.clone()));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(client.snapshot().await.unwrap().profile, Some(updated));
    api.verify();
}

#[tokio::test]
async fn test_resolve_none_clears_synchronously() {
    let api = MockMarketApi::new();
    let client = start(LocalAuthProvider::new(), &api);

    assert_eq!(client.resolve(None).await, Ok(Resolution::Cleared));
    let snapshot = client.snapshot().await.unwrap();
    assert!(!snapshot.loading);
    assert!(!snapshot.is_authenticated());
}
