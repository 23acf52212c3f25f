//! # Generic Client
//!
//! This module defines the generic client for communicating with a `MachineActor`.

use crate::error::FrameworkError;
use crate::machine::StateMachine;
use crate::message::MachineRequest;
use tokio::sync::{mpsc, oneshot, watch};

/// ## MachineClient
///
/// The `MachineClient<M>` provides a type‑safe, async API for interacting with a
/// `MachineActor<M>`. Commands travel over a Tokio mpsc channel and replies come back on
/// oneshot channels. Every client also carries a watch receiver on the machine's published
/// snapshot, so callers can wait for a state instead of polling for it.
///
/// * **Cloneable** – holds only a sender and a watch receiver.
/// * **Owning** – the actor stops once the last clone is dropped.
pub struct MachineClient<M: StateMachine> {
    sender: mpsc::Sender<MachineRequest<M>>,
    watcher: watch::Receiver<M::Snapshot>,
}

impl<M: StateMachine> Clone for MachineClient<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            watcher: self.watcher.clone(),
        }
    }
}

impl<M: StateMachine> MachineClient<M> {
    pub fn new(
        sender: mpsc::Sender<MachineRequest<M>>,
        watcher: watch::Receiver<M::Snapshot>,
    ) -> Self {
        Self { sender, watcher }
    }

    pub async fn send(&self, command: M::Command) -> Result<M::Reply, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(MachineRequest::Command {
                command,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn snapshot(&self) -> Result<M::Snapshot, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(MachineRequest::Snapshot { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// A fresh receiver on the published snapshot.
    pub fn watch(&self) -> watch::Receiver<M::Snapshot> {
        self.watcher.clone()
    }

    /// Waits until the published snapshot satisfies `predicate` and returns it.
    ///
    /// Resolves immediately if the current snapshot already matches. Fails with
    /// [`FrameworkError::ActorClosed`] if the actor stops before it ever does.
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&M::Snapshot) -> bool,
    ) -> Result<M::Snapshot, FrameworkError> {
        let mut watcher = self.watcher.clone();
        let snapshot = watcher
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        Ok((*snapshot).clone())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
