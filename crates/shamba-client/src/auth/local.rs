use crate::auth::{AuthError, AuthEvent, AuthProvider, AuthSubscription};
use crate::model::{Session, SessionTokens};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// In-memory provider: a session cache plus event fan-out to every live subscription.
#[derive(Clone, Default)]
pub struct LocalAuthProvider {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    session: Mutex<Option<Session>>,
    observers: Mutex<Observers>,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<AuthEvent>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LocalAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that already holds `session`, without emitting anything.
    pub fn with_session(session: Session) -> Self {
        let provider = Self::new();
        *lock(&provider.inner.session) = Some(session);
        provider
    }

    /// Stores `session` and emits `SignedIn`.
    pub fn sign_in(&self, session: Session) {
        info!(identity = %session.identity(), "Signed in");
        *lock(&self.inner.session) = Some(session.clone());
        self.emit(AuthEvent::SignedIn(session));
    }

    /// Stores `session` and emits `TokenRefreshed`.
    pub fn refresh(&self, session: Session) {
        debug!(identity = %session.identity(), "Token refreshed");
        *lock(&self.inner.session) = Some(session.clone());
        self.emit(AuthEvent::TokenRefreshed(session));
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.observers).senders.len()
    }

    fn emit(&self, event: AuthEvent) {
        let mut observers = lock(&self.inner.observers);
        observers
            .senders
            .retain(|_, sender| sender.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(lock(&self.inner.session).clone())
    }

    async fn set_session(&self, tokens: SessionTokens) -> Result<Session, AuthError> {
        let session = {
            let mut current = lock(&self.inner.session);
            let session = current.as_mut().ok_or(AuthError::NoSession)?;
            session.access_token = tokens.access_token;
            session.refresh_token = tokens.refresh_token;
            session.clone()
        };
        self.emit(AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let previous = lock(&self.inner.session).take();
        if let Some(session) = previous {
            info!(identity = %session.identity(), "Signed out");
        }
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = {
            let mut observers = lock(&self.inner.observers);
            let id = observers.next_id;
            observers.next_id += 1;
            observers.senders.insert(id, sender);
            id
        };
        debug!(subscription = id, "Auth observer registered");

        let registry = Arc::downgrade(&self.inner);
        AuthSubscription::new(receiver, move || {
            if let Some(inner) = registry.upgrade() {
                lock(&inner.observers).senders.remove(&id);
                debug!(subscription = id, "Auth observer released");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> Session {
        Session::new(id, format!("{id}@example.com"), format!("jwt-{id}"))
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_and_notifies() {
        let provider = LocalAuthProvider::new();
        let mut subscription = provider.subscribe();

        provider.sign_in(session("u1"));

        assert_eq!(
            provider.get_session().await.unwrap().unwrap().identity(),
            "u1"
        );
        assert_eq!(
            subscription.recv().await,
            Some(AuthEvent::SignedIn(session("u1")))
        );
    }

    #[tokio::test]
    async fn test_set_session_replaces_tokens() {
        let provider = LocalAuthProvider::with_session(session("u1"));
        let mut subscription = provider.subscribe();

        let updated = provider
            .set_session(SessionTokens {
                access_token: "jwt-2".to_string(),
                refresh_token: "r-2".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(updated.access_token, "jwt-2");
        assert_eq!(updated.identity(), "u1");
        assert_eq!(
            subscription.recv().await,
            Some(AuthEvent::TokenRefreshed(updated))
        );
    }

    #[tokio::test]
    async fn test_set_session_without_session_fails() {
        let provider = LocalAuthProvider::new();
        let result = provider
            .set_session(SessionTokens {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
            })
            .await;
        assert_eq!(result, Err(AuthError::NoSession));
    }

    #[tokio::test]
    async fn test_failed_set_session_emits_nothing() {
        let provider = LocalAuthProvider::new();
        let mut subscription = provider.subscribe();
        let tokens = SessionTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };

        assert!(provider.set_session(tokens).await.is_err());
        provider.sign_in(session("u1"));
        assert_eq!(
            subscription.recv().await,
            Some(AuthEvent::SignedIn(session("u1")))
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_and_notifies() {
        let provider = LocalAuthProvider::with_session(session("u1"));
        let mut subscription = provider.subscribe();

        provider.sign_out().await.unwrap();

        assert_eq!(provider.get_session().await.unwrap(), None);
        assert_eq!(subscription.recv().await, Some(AuthEvent::SignedOut));
    }

    #[tokio::test]
    async fn test_dropping_subscription_deregisters() {
        let provider = LocalAuthProvider::new();
        let first = provider.subscribe();
        let _second = provider.subscribe();
        assert_eq!(provider.subscriber_count(), 2);

        drop(first);
        assert_eq!(provider.subscriber_count(), 1);

        provider.sign_in(session("u1"));
        assert_eq!(provider.subscriber_count(), 1);
    }
}
