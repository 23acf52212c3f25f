//! # StateMachine Trait
//!
//! The `StateMachine` trait is the contract every stateful component (session resolver,
//! payment poller, …) implements to be driven by the generic [`MachineActor`](crate::MachineActor).
//!
//! A machine reacts to two kinds of input:
//!
//! - **Commands** arrive from clients and always get a reply.
//! - **Events** are posted back by the machine's own child tasks (timers, network calls)
//!   through the [`Outbox`]. They never get a reply.
//!
//! Both are processed sequentially inside the actor task, so a machine mutates its state
//! without locks. After every command or event the actor publishes a fresh
//! [`StateMachine::snapshot`] to watchers.

use crate::message::Outbox;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait that any state machine must implement to be hosted by a [`MachineActor`](crate::MachineActor).
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they can await other services. Dependencies are passed as
/// `Context` to `run()` rather than to `new()`, the same late binding the actor framework
/// always used for entity hooks.
///
/// # Child tasks
/// A hook that starts background work (a timer, an HTTP request) must own the handle to
/// it and tag what it posts with a [`Generation`](crate::Generation), so results that arrive
/// after a restart or cancel can be recognised and dropped.
#[async_trait]
pub trait StateMachine: Send + 'static {
    /// Requests sent by clients.
    type Command: Send + Debug;

    /// Reply returned for each command.
    type Reply: Send + Debug;

    /// Internal events posted by the machine's own child tasks.
    type Event: Send + Debug + 'static;

    /// Observable state published to watchers.
    type Snapshot: Clone + PartialEq + Send + Sync + Debug + 'static;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The machine-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Handle a client command.
    async fn on_command(
        &mut self,
        command: Self::Command,
        ctx: &Self::Context,
        outbox: &Outbox<Self::Event>,
    ) -> Result<Self::Reply, Self::Error>;

    /// Handle an event posted by one of the machine's child tasks.
    async fn on_event(
        &mut self,
        event: Self::Event,
        ctx: &Self::Context,
        outbox: &Outbox<Self::Event>,
    );

    /// Current observable state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Called once after the last client is dropped, before the actor task ends.
    ///
    /// Machines release their timers and in-flight work here.
    async fn on_stop(&mut self, _ctx: &Self::Context) {}
}
