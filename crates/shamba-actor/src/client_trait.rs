//! # ActorClient Trait
//!
//! Provides a common interface for machine‑specific clients, adding default `snapshot`
//! and `watch` methods built on top of a generic `MachineClient`.
use crate::{FrameworkError, MachineClient, StateMachine};
use async_trait::async_trait;
use tokio::sync::watch;

/// Trait for machine-specific clients to inherit the standard read operations.
///
/// A domain client wraps a [`MachineClient`], exposes typed methods for each command,
/// and implements this trait to get `snapshot()` and `watch()` for free.
///
/// ```rust,ignore
/// #[async_trait]
/// impl ActorClient<PaymentPoller> for PaymentClient {
///     type Error = PaymentError;
///
///     fn inner(&self) -> &MachineClient<PaymentPoller> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         PaymentError::ActorCommunicationError(e.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait ActorClient<M: StateMachine>: Send + Sync {
    /// The machine-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic MachineClient.
    fn inner(&self) -> &MachineClient<M>;

    /// Map framework errors to the specific machine error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch the machine's current state.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<M::Snapshot, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().snapshot().await.map_err(Self::map_error)
    }

    /// Subscribe to every published state change.
    fn watch(&self) -> watch::Receiver<M::Snapshot> {
        self.inner().watch()
    }
}
