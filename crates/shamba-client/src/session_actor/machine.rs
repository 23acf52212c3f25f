use crate::api::MarketApi;
use crate::auth::{AuthEvent, AuthProvider};
use crate::model::{Session, UserProfile};
use crate::session_actor::{
    FetchFailure, Resolution, SessionCommand, SessionError, SessionEvent, SessionSnapshot,
    FALLBACK_ADVISORY, SESSION_UNAVAILABLE,
};
use async_trait::async_trait;
use shamba_actor::{Generation, Outbox, StateMachine, TaskHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Dependencies injected into the resolver at `run()`.
pub struct SessionContext {
    pub auth: Arc<dyn AuthProvider>,
    pub api: Arc<dyn MarketApi>,
}

struct InFlight {
    identity: String,
    _task: TaskHandle,
}

pub struct SessionResolver {
    deadline: Duration,
    session: Option<Session>,
    profile: Option<UserProfile>,
    /// Session identity the held non-fallback profile was fetched for.
    fetched_for: Option<String>,
    loading: bool,
    error: Option<String>,
    /// Identity whose sign-in has already been handled.
    processed: Option<String>,
    in_flight: Option<InFlight>,
    generation: Generation,
}

impl SessionResolver {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            session: None,
            profile: None,
            fetched_for: None,
            loading: true,
            error: None,
            processed: None,
            in_flight: None,
            generation: Generation::default(),
        }
    }

    fn resolve(
        &mut self,
        session: Option<Session>,
        ctx: &SessionContext,
        outbox: &Outbox<SessionEvent>,
    ) -> Resolution {
        let Some(session) = session else {
            self.clear();
            return Resolution::Cleared;
        };

        if let Some(in_flight) = &self.in_flight {
            if in_flight.identity == session.identity() {
                debug!(identity = %session.identity(), "Profile fetch already in progress, skipping");
                return Resolution::Skipped;
            }
            info!(
                previous = %in_flight.identity,
                identity = %session.identity(),
                "Superseding profile fetch"
            );
        }

        self.begin_fetch(session, ctx, outbox);
        Resolution::Fetching
    }

    fn begin_fetch(
        &mut self,
        session: Session,
        ctx: &SessionContext,
        outbox: &Outbox<SessionEvent>,
    ) {
        let generation = self.generation.advance();
        let identity = session.identity().to_string();
        self.loading = true;
        self.error = None;
        info!(%identity, %generation, "Fetching profile");

        let api = ctx.api.clone();
        let deadline = self.deadline;
        let outbox = outbox.clone();
        let task = TaskHandle::spawn(async move {
            let started = Instant::now();
            let result = match tokio::time::timeout(deadline, api.get_me()).await {
                Ok(Ok(profile)) => Ok(profile),
                Ok(Err(e)) => Err(FetchFailure::Api(e)),
                Err(_) => Err(FetchFailure::Deadline(deadline)),
            };
            outbox.post(SessionEvent::ProfileFetched {
                generation,
                session,
                elapsed: started.elapsed(),
                result,
            });
        });

        // Replacing the previous entry aborts a superseded fetch.
        self.in_flight = Some(InFlight {
            identity,
            _task: task,
        });
    }

    /// Drops the profile and invalidates any in-flight fetch.
    fn clear(&mut self) {
        self.in_flight = None;
        self.generation.advance();
        self.profile = None;
        self.fetched_for = None;
        self.error = None;
        self.loading = false;
    }

    fn on_profile_fetched(
        &mut self,
        session: Session,
        elapsed: Duration,
        result: Result<UserProfile, FetchFailure>,
    ) {
        self.in_flight = None;
        self.loading = false;
        let identity = session.identity();
        let elapsed_ms = elapsed.as_millis() as u64;

        match result {
            Ok(profile) => {
                info!(%identity, elapsed_ms, role = %profile.role, "Profile fetched");
                self.profile = Some(profile);
                self.fetched_for = Some(identity.to_string());
                self.error = None;
            }
            Err(failure) => {
                warn!(%identity, elapsed_ms, error = %failure, "Profile fetch failed");
                if self.fetched_for.as_deref() == Some(identity) {
                    info!(%identity, "Keeping previously fetched profile");
                } else {
                    self.profile = Some(UserProfile::fallback_for(&session));
                    self.fetched_for = None;
                }
                self.error = Some(FALLBACK_ADVISORY.to_string());
            }
        }
    }
}

#[async_trait]
impl StateMachine for SessionResolver {
    type Command = SessionCommand;
    type Reply = Resolution;
    type Event = SessionEvent;
    type Snapshot = SessionSnapshot;
    type Context = SessionContext;
    type Error = SessionError;

    async fn on_command(
        &mut self,
        command: SessionCommand,
        ctx: &SessionContext,
        outbox: &Outbox<SessionEvent>,
    ) -> Result<Resolution, SessionError> {
        match command {
            SessionCommand::Initialize => {
                self.loading = true;
                match ctx.auth.get_session().await {
                    Err(e) => {
                        error!(error = %e, "Session fetch error");
                        self.loading = false;
                        self.error = Some(SESSION_UNAVAILABLE.to_string());
                        Ok(Resolution::SessionUnavailable)
                    }
                    Ok(None) => {
                        info!("No active session");
                        self.session = None;
                        self.processed = None;
                        self.clear();
                        Ok(Resolution::Cleared)
                    }
                    Ok(Some(session)) => {
                        self.session = Some(session.clone());
                        self.processed = Some(session.identity().to_string());
                        Ok(self.resolve(Some(session), ctx, outbox))
                    }
                }
            }
            SessionCommand::Resolve(session) => {
                self.session = session.clone();
                Ok(self.resolve(session, ctx, outbox))
            }
            SessionCommand::Refetch => {
                info!("Manual profile refetch");
                self.in_flight = None;
                Ok(self.resolve(self.session.clone(), ctx, outbox))
            }
            SessionCommand::AuthChanged(event) => match event {
                AuthEvent::SignedIn(session) => {
                    if self.processed.as_deref() == Some(session.identity()) {
                        debug!(identity = %session.identity(), "Sign-in already processed, skipping");
                        return Ok(Resolution::Skipped);
                    }
                    self.session = Some(session.clone());
                    self.processed = Some(session.identity().to_string());
                    Ok(self.resolve(Some(session), ctx, outbox))
                }
                AuthEvent::TokenRefreshed(session) => {
                    self.session = Some(session.clone());
                    if self.profile.is_none() {
                        Ok(self.resolve(Some(session), ctx, outbox))
                    } else {
                        debug!(identity = %session.identity(), "Token refreshed, keeping profile");
                        Ok(Resolution::Unchanged)
                    }
                }
                AuthEvent::SignedOut => {
                    info!("Signed out, clearing profile");
                    self.session = None;
                    self.processed = None;
                    self.clear();
                    Ok(Resolution::Cleared)
                }
            },
        }
    }

    async fn on_event(
        &mut self,
        event: SessionEvent,
        _ctx: &SessionContext,
        _outbox: &Outbox<SessionEvent>,
    ) {
        let SessionEvent::ProfileFetched {
            generation,
            session,
            elapsed,
            result,
        } = event;

        if !self.generation.is_current(generation) {
            debug!(%generation, identity = %session.identity(), "Discarding stale profile result");
            return;
        }
        self.on_profile_fetched(session, elapsed, result);
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session.clone(),
            profile: self.profile.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }

    async fn on_stop(&mut self, _ctx: &SessionContext) {
        self.in_flight = None;
    }
}
