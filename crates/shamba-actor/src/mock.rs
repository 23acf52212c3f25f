//! # Mock Framework & Testing Guide
//!
//! The `MockClient<M>` type hands out a real [`MachineClient<M>`] whose requests are
//! answered from a queue of expectations instead of a running machine. It lets you test
//! client wrappers (e.g. `PaymentClient`) and anything that forwards commands to them
//! without spawning the machine itself.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler and timers |
//! | **State** | Scripted replies and snapshots | Real state machine |
//! | **Use Case** | Logic *around* the client | The machine itself or the full system |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Two styles
//!
//! - **Fluent**: [`MockClient`] with `expect_command()` / `expect_snapshot()` builders and
//!   [`MockClient::verify`].
//! - **Manual**: [`create_mock_client`] returns the client and the raw request receiver;
//!   [`expect_command`] pulls the next command out so the test can inspect it and answer
//!   on its responder.
//!
//! ```rust
//! use shamba_actor::mock::MockClient;
//! use shamba_actor::{FrameworkError, Outbox, StateMachine};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)] struct Never;
//! impl std::fmt::Display for Never {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "never") }
//! }
//! impl std::error::Error for Never {}
//!
//! struct Lamp;
//!
//! #[async_trait]
//! impl StateMachine for Lamp {
//!     type Command = bool; type Reply = bool; type Event = ();
//!     type Snapshot = bool; type Context = (); type Error = Never;
//!     async fn on_command(&mut self, on: bool, _: &(), _: &Outbox<()>) -> Result<bool, Never> { Ok(on) }
//!     async fn on_event(&mut self, _: (), _: &(), _: &Outbox<()>) {}
//!     fn snapshot(&self) -> bool { false }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Lamp>::new();
//!     mock.expect_command().return_ok(true);
//!     mock.expect_snapshot().return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert!(client.send(true).await.unwrap());
//!     assert!(matches!(client.snapshot().await, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```

use crate::{FrameworkError, MachineClient, MachineRequest, Response, StateMachine};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected request to the mock client.
enum Expectation<M: StateMachine> {
    Command {
        response: Result<M::Reply, FrameworkError>,
    },
    Snapshot {
        response: Result<M::Snapshot, FrameworkError>,
    },
}

type Expectations<M> = Arc<Mutex<VecDeque<Expectation<M>>>>;

/// A mock client with expectation tracking for fluent testing.
pub struct MockClient<M: StateMachine> {
    client: MachineClient<M>,
    expectations: Expectations<M>,
    published: watch::Sender<M::Snapshot>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<M: StateMachine> MockClient<M>
where
    M::Snapshot: Default,
{
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<MachineRequest<M>>(100);
        let (published, watcher) = watch::channel(M::Snapshot::default());
        let expectations: Expectations<M> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        MachineRequest::Command { respond_to, .. },
                        Some(Expectation::Command { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        MachineRequest::Snapshot { respond_to },
                        Some(Expectation::Snapshot { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: MachineClient::new(sender, watcher),
            expectations,
            published,
            _handle: handle,
        }
    }
}

impl<M: StateMachine> Default for MockClient<M>
where
    M::Snapshot: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StateMachine> MockClient<M> {
    /// Returns the client for use in tests.
    pub fn client(&self) -> MachineClient<M> {
        self.client.clone()
    }

    /// Expects a command.
    pub fn expect_command(&mut self) -> ExpectationBuilder<M> {
        ExpectationBuilder {
            kind: Kind::Command,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a snapshot read.
    pub fn expect_snapshot(&mut self) -> ExpectationBuilder<M> {
        ExpectationBuilder {
            kind: Kind::Snapshot,
            expectations: self.expectations.clone(),
        }
    }

    /// Publishes a snapshot to every watcher of the mock client.
    pub fn publish(&self, snapshot: M::Snapshot) {
        self.published.send_replace(snapshot);
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

enum Kind {
    Command,
    Snapshot,
}

/// Builder for a single expectation.
pub struct ExpectationBuilder<M: StateMachine> {
    kind: Kind,
    expectations: Expectations<M>,
}

impl<M: StateMachine> ExpectationBuilder<M> {
    /// Answers a command expectation with `reply`.
    ///
    /// # Panics
    /// If the builder came from `expect_snapshot`.
    pub fn return_ok(self, reply: M::Reply) {
        assert!(
            matches!(self.kind, Kind::Command),
            "return_ok on a snapshot expectation, use return_snapshot"
        );
        self.push(Expectation::Command {
            response: Ok(reply),
        });
    }

    /// Answers a snapshot expectation with `snapshot`.
    ///
    /// # Panics
    /// If the builder came from `expect_command`.
    pub fn return_snapshot(self, snapshot: M::Snapshot) {
        assert!(
            matches!(self.kind, Kind::Snapshot),
            "return_snapshot on a command expectation, use return_ok"
        );
        self.push(Expectation::Snapshot {
            response: Ok(snapshot),
        });
    }

    /// Answers either kind of expectation with an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = match self.kind {
            Kind::Command => Expectation::Command {
                response: Err(error),
            },
            Kind::Snapshot => Expectation::Snapshot {
                response: Err(error),
            },
        };
        self.push(expectation);
    }

    fn push(self, expectation: Expectation<M>) {
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// MANUAL HELPERS
// =============================================================================

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// The test owns the receiving end of the request channel, pulls requests off it with
/// [`expect_command`] / [`expect_snapshot`], inspects them, and answers on the responder.
/// The returned watch sender drives the client's published snapshot.
pub fn create_mock_client<M: StateMachine>(
    buffer_size: usize,
) -> (
    MachineClient<M>,
    mpsc::Receiver<MachineRequest<M>>,
    watch::Sender<M::Snapshot>,
)
where
    M::Snapshot: Default,
{
    let (sender, receiver) = mpsc::channel(buffer_size);
    let (published, watcher) = watch::channel(M::Snapshot::default());
    (MachineClient::new(sender, watcher), receiver, published)
}

/// Helper to verify that the next message is a Command request
pub async fn expect_command<M: StateMachine>(
    receiver: &mut mpsc::Receiver<MachineRequest<M>>,
) -> Option<(M::Command, Response<M::Reply>)> {
    match receiver.recv().await {
        Some(MachineRequest::Command {
            command,
            respond_to,
        }) => Some((command, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Snapshot request
pub async fn expect_snapshot<M: StateMachine>(
    receiver: &mut mpsc::Receiver<MachineRequest<M>>,
) -> Option<Response<M::Snapshot>> {
    match receiver.recv().await {
        Some(MachineRequest::Snapshot { respond_to }) => Some(respond_to),
        _ => None,
    }
}
