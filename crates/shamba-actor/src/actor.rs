//! # Generic Actor Server
//!
//! This module defines the `MachineActor`, the component that owns a [`StateMachine`] and
//! drives it. It implements the "Server" side of the Actor Model: commands from clients and
//! events from the machine's child tasks are processed one at a time, so the machine has
//! exclusive access to its state.

use crate::client::MachineClient;
use crate::error::FrameworkError;
use crate::machine::StateMachine;
use crate::message::{MachineRequest, Outbox};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

/// The generic actor that hosts one state machine.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the machine, the receiver end of
/// the request channel and the receiver end of the machine's event queue.
///
/// **Concurrency Model**:
/// The run loop waits on both queues at once but handles one message at a time. A timer
/// tick can never interleave with a command half-way through, which is what lets machines
/// skip `Mutex` entirely.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `MachineActor::new()` to get the `actor` (server) and `client` (interface).
/// 2.  **Wire**: Pass dependencies into `actor.run(context)`.
/// 3.  **Run**: Spawn the run loop in a background task.
///
/// ```rust
/// use shamba_actor::{MachineActor, Outbox, StateMachine};
/// use async_trait::async_trait;
///
/// #[derive(Debug)] struct Never;
/// impl std::fmt::Display for Never {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "never") }
/// }
/// impl std::error::Error for Never {}
///
/// struct Counter { value: u32 }
///
/// #[async_trait]
/// impl StateMachine for Counter {
///     type Command = u32;
///     type Reply = u32;
///     type Event = ();
///     type Snapshot = u32;
///     type Context = ();
///     type Error = Never;
///
///     async fn on_command(&mut self, add: u32, _: &(), _: &Outbox<()>) -> Result<u32, Never> {
///         self.value += add;
///         Ok(self.value)
///     }
///     async fn on_event(&mut self, _: (), _: &(), _: &Outbox<()>) {}
///     fn snapshot(&self) -> u32 { self.value }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = MachineActor::new(Counter { value: 0 }, 10);
///     tokio::spawn(actor.run(()));
///     assert_eq!(client.send(2).await.unwrap(), 2);
///     assert_eq!(client.snapshot().await.unwrap(), 2);
/// }
/// ```
///
/// # Shutdown
///
/// The loop ends when every client has been dropped. The actor then calls
/// [`StateMachine::on_stop`], publishes the final snapshot and returns. Child tasks notice
/// the closed [`Outbox`] on their next post.
pub struct MachineActor<M: StateMachine> {
    machine: M,
    receiver: mpsc::Receiver<MachineRequest<M>>,
    events: mpsc::UnboundedReceiver<M::Event>,
    outbox: Outbox<M::Event>,
    published: watch::Sender<M::Snapshot>,
}

impl<M: StateMachine> MachineActor<M> {
    /// Creates a new `MachineActor` and its associated `MachineClient`.
    ///
    /// # Arguments
    ///
    /// * `machine` - The initial machine state.
    /// * `buffer_size` - The capacity of the request channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(machine: M, buffer_size: usize) -> (Self, MachineClient<M>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (event_sender, events) = mpsc::unbounded_channel();
        let (published, watcher) = watch::channel(machine.snapshot());
        let actor = Self {
            machine,
            receiver,
            events,
            outbox: Outbox::new(event_sender),
            published,
        };
        let client = MachineClient::new(sender, watcher);
        (actor, client)
    }

    /// Runs the actor's event loop until every client has been dropped.
    ///
    /// # Context Injection
    /// The `context` argument is handed to every machine hook.
    pub async fn run(mut self, context: M::Context) {
        // Extract just the type name (e.g., "PaymentPoller" instead of the full module path)
        let machine_type = std::any::type_name::<M>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(machine_type, "Actor started");

        loop {
            tokio::select! {
                request = self.receiver.recv() => {
                    let Some(request) = request else { break };
                    match request {
                        MachineRequest::Command { command, respond_to } => {
                            debug!(machine_type, ?command, "Command");
                            let result = self
                                .machine
                                .on_command(command, &context, &self.outbox)
                                .await
                                .map_err(|e| FrameworkError::MachineError(Box::new(e)));
                            if let Err(e) = &result {
                                warn!(machine_type, error = %e, "Command failed");
                            }
                            // Watchers see the new state before the caller gets its reply.
                            self.publish();
                            let _ = respond_to.send(result);
                        }
                        MachineRequest::Snapshot { respond_to } => {
                            let _ = respond_to.send(Ok(self.machine.snapshot()));
                        }
                    }
                }
                Some(event) = self.events.recv() => {
                    trace!(machine_type, ?event, "Event");
                    self.machine.on_event(event, &context, &self.outbox).await;
                }
            }
            self.publish();
        }

        self.machine.on_stop(&context).await;
        self.publish();
        info!(machine_type, "Shutdown");
    }

    fn publish(&self) {
        let snapshot = self.machine.snapshot();
        self.published.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
