//! # System Lifecycle
//!
//! Starts the marketplace actors, wires their dependencies, and shuts them down.
//!
//! ## Wiring
//!
//! Both machines get their dependencies at `run()`:
//!
//! - the Session Resolver runs with a [`SessionContext`](crate::session_actor::SessionContext)
//!   holding the auth provider and the API;
//! - the Payment Poller runs with the API alone.
//!
//! The provider's lifecycle events reach the resolver through an auth bridge: a task that
//! owns the provider [`AuthSubscription`](crate::auth::AuthSubscription) and forwards each
//! event to [`SessionClient::notify`](crate::clients::SessionClient::notify).
//!
//! ## Shutdown
//!
//! 1. Abort the auth bridge; dropping its subscription deregisters the observer.
//! 2. Drop every client, closing the actors' request channels.
//! 3. Await each actor task. The machines' `on_stop` hooks release their timers.

pub mod market_system;

pub use market_system::*;
