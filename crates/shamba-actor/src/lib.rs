//! # Shamba Actor
//!
//! Foundational building blocks for hosting small, timer-driven state machines as actors
//! on Tokio.
//!
//! ## The Model
//!
//! A [`StateMachine`] owns its state and reacts to two inputs:
//!
//! - **Commands** from clients (`start`, `cancel`, `refetch`, …), each answered with a reply.
//! - **Events** posted back by the machine's own child tasks: interval ticks, finished
//!   HTTP requests, one-shot delays.
//!
//! A [`MachineActor`] hosts one machine in one Tokio task and handles these inputs strictly
//! one at a time. State therefore needs no locks, and "concurrency" inside a machine is only
//! ever interleaving of its callbacks, never parallel mutation.
//!
//! ## Ownership of Background Work
//!
//! Machines do not start ambient timers. Every child task is held as a
//! [`TaskHandle`](timer::TaskHandle) that aborts on drop, and every event it posts carries
//! the [`Generation`](timer::Generation) it was started under:
//!
//! - cancelling is dropping the handle;
//! - restarting is advancing the generation, which turns anything still queued from the
//!   previous run into a stale event the machine ignores;
//! - shutting down is dropping the last client: the run loop ends, the machine's
//!   [`on_stop`](StateMachine::on_stop) hook runs, and its handles go with it.
//!
//! ## Observing State
//!
//! After each command or event the actor publishes [`StateMachine::snapshot`] on a watch
//! channel. [`MachineClient::wait_for`] turns that into "wait until the machine reaches X",
//! which is how callers and tests observe asynchronous outcomes.
//!
//! ## Testing
//!
//! - Drive timers with `#[tokio::test(start_paused = true)]`; the paused clock jumps straight
//!   to the next deadline whenever every task is idle.
//! - Use [`mock::MockClient`] or [`mock::create_mock_client`] to test client wrappers
//!   without a running machine.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod error;
pub mod machine;
pub mod message;
pub mod mock;
pub mod timer;
pub mod tracing;

// Re-export core types for convenience
pub use actor::MachineActor;
pub use client::MachineClient;
pub use client_trait::ActorClient;
pub use error::FrameworkError;
pub use machine::StateMachine;
pub use message::{outbox, MachineRequest, Outbox, Response};
pub use timer::{Generation, TaskHandle};
