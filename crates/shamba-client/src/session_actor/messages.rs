use crate::api::ApiError;
use crate::auth::AuthEvent;
use crate::model::{Session, UserProfile};
use shamba_actor::Generation;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug)]
pub enum SessionCommand {
    /// Read the provider's current session and resolve it.
    Initialize,
    /// Resolve the given session, or clear everything for `None`.
    Resolve(Option<Session>),
    /// Drop any in-flight fetch and fetch the cached session's profile again.
    Refetch,
    /// A lifecycle event from the identity provider.
    AuthChanged(AuthEvent),
}

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A profile fetch was started.
    Fetching,
    /// A fetch for this identity is already running, or this sign-in was already handled.
    Skipped,
    /// No session: profile and error were cleared.
    Cleared,
    /// The session was updated and the held profile kept.
    Unchanged,
    /// The identity provider failed to report a session.
    SessionUnavailable,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchFailure {
    #[error("profile fetch exceeded {}ms", .0.as_millis())]
    Deadline(Duration),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug)]
pub enum SessionEvent {
    ProfileFetched {
        generation: Generation,
        session: Session,
        elapsed: Duration,
        result: Result<UserProfile, FetchFailure>,
    },
}

/// Published resolver state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub profile: Option<UserProfile>,
    pub loading: bool,
    /// Advisory text for the user, set only after a failed fetch or provider error.
    pub error: Option<String>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            session: None,
            profile: None,
            loading: true,
            error: None,
        }
    }
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the held profile was synthesized from the session.
    pub fn is_degraded(&self) -> bool {
        self.profile.as_ref().is_some_and(|profile| profile.fallback)
    }
}
