//! Identity-provider contract.
//!
//! The provider owns the session. The application reads it, asks for changes, and
//! observes lifecycle events through an [`AuthSubscription`] whose registration is
//! released when the subscription is dropped.

pub mod local;

pub use local::LocalAuthProvider;

use crate::model::{Session, SessionTokens};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("No active session")]
    NoSession,
    #[error("Auth provider error: {0}")]
    Provider(String),
}

/// Session lifecycle notifications emitted by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::SignedIn(_) => "SIGNED_IN",
            AuthEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            AuthEvent::SignedOut => "SIGNED_OUT",
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => Some(session),
            AuthEvent::SignedOut => None,
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The provider's current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Replaces the tokens of the current session and emits `TokenRefreshed`.
    ///
    /// Tokens alone carry no identity, so this never establishes a session: with none
    /// held it fails with [`AuthError::NoSession`] and emits nothing. Logging in is the
    /// provider's own operation and is announced as `SignedIn`.
    async fn set_session(&self, tokens: SessionTokens) -> Result<Session, AuthError>;

    /// Clears the session and emits `SignedOut`.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Registers an observer for lifecycle events.
    fn subscribe(&self) -> AuthSubscription;
}

/// A live observer registration. Dropping it deregisters the observer.
pub struct AuthSubscription {
    events: mpsc::UnboundedReceiver<AuthEvent>,
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl AuthSubscription {
    /// Wraps a provider's event channel; `unsubscribe` runs exactly once, on drop.
    pub fn new(
        events: mpsc::UnboundedReceiver<AuthEvent>,
        unsubscribe: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Next event, or `None` once the provider is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }
}

impl std::fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_exposes_session_except_on_sign_out() {
        let session = Session::new("u1", "u1@example.com", "jwt");

        let signed_in = AuthEvent::SignedIn(session.clone());
        assert_eq!(signed_in.name(), "SIGNED_IN");
        assert_eq!(signed_in.session(), Some(&session));
        assert_eq!(
            AuthEvent::TokenRefreshed(session.clone()).session(),
            Some(&session)
        );
        assert_eq!(AuthEvent::SignedOut.session(), None);
    }
}
