//! # Generic Messages
//!
//! This module defines the message types exchanged between a `MachineClient`, the
//! `MachineActor` that hosts a machine, and the machine's own child tasks.

use crate::error::FrameworkError;
use crate::machine::StateMachine;
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Request sent by a client to the actor.
///
/// - **Command**: forwarded to [`StateMachine::on_command`]; the reply travels back on `respond_to`.
/// - **Snapshot**: read the machine's current observable state.
#[derive(Debug)]
pub enum MachineRequest<M: StateMachine> {
    Command {
        command: M::Command,
        respond_to: Response<M::Reply>,
    },
    Snapshot {
        respond_to: Response<M::Snapshot>,
    },
}

/// Sending half of a machine's internal event queue.
///
/// Child tasks hold a clone and post their results here. Posting never blocks; it fails
/// only once the actor has shut down, which tells the child task to stop.
pub struct Outbox<E> {
    sender: mpsc::UnboundedSender<E>,
}

impl<E> Clone for Outbox<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: Send + 'static> Outbox<E> {
    pub(crate) fn new(sender: mpsc::UnboundedSender<E>) -> Self {
        Self { sender }
    }

    /// Posts an event to the owning actor. Returns `false` if the actor is gone.
    pub fn post(&self, event: E) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Returns `true` once the owning actor has shut down.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Creates a detached outbox and the receiver that drains it.
///
/// Used by tests that drive a [`StateMachine`] by hand without spawning an actor.
pub fn outbox<E: Send + 'static>() -> (Outbox<E>, mpsc::UnboundedReceiver<E>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Outbox::new(sender), receiver)
}
