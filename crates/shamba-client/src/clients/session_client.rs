//! # Session Client
//!
//! Typed API over the Session Resolver actor.
use crate::auth::AuthEvent;
use crate::model::Session;
use crate::session_actor::{Resolution, SessionCommand, SessionError, SessionResolver, SessionSnapshot};
use async_trait::async_trait;
use shamba_actor::{ActorClient, FrameworkError, MachineClient};
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SessionClient {
    inner: MachineClient<SessionResolver>,
}

impl SessionClient {
    pub fn new(inner: MachineClient<SessionResolver>) -> Self {
        Self { inner }
    }

    async fn send(&self, command: SessionCommand) -> Result<Resolution, SessionError> {
        debug!("Sending request");
        self.inner.send(command).await.map_err(Self::map_error)
    }

    /// Reads the provider's current session and resolves it.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<Resolution, SessionError> {
        self.send(SessionCommand::Initialize).await
    }

    #[instrument(skip(self, session), fields(identity = session.as_ref().map(Session::identity)))]
    pub async fn resolve(&self, session: Option<Session>) -> Result<Resolution, SessionError> {
        self.send(SessionCommand::Resolve(session)).await
    }

    /// Forces a fresh profile fetch for the cached session.
    #[instrument(skip(self))]
    pub async fn refetch(&self) -> Result<Resolution, SessionError> {
        self.send(SessionCommand::Refetch).await
    }

    #[instrument(skip(self, event), fields(event = event.name()))]
    pub async fn notify(&self, event: AuthEvent) -> Result<Resolution, SessionError> {
        self.send(SessionCommand::AuthChanged(event)).await
    }

    /// Waits until no resolution is in progress.
    pub async fn wait_until_settled(&self) -> Result<SessionSnapshot, SessionError> {
        self.inner
            .wait_for(|snapshot| !snapshot.loading)
            .await
            .map_err(Self::map_error)
    }
}

#[async_trait]
impl ActorClient<SessionResolver> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &MachineClient<SessionResolver> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        SessionError::ActorCommunicationError(e.to_string())
    }
}
