//! # Session Resolver
//!
//! Turns the identity provider's session into an application [`UserProfile`].
//!
//! ## Overview
//!
//! Given a session, the resolver fetches `GET /users/me` and races it against a deadline
//! (3 s by default). A fetch that fails or misses the deadline degrades to a fallback
//! profile synthesized from the session, marked with `fallback = true`, plus the advisory
//! `"Using cached profile (backend slow)"`. Without a session there is no profile and no
//! error.
//!
//! The resolver runs at most one fetch at a time. A second request for the identity that
//! is already being fetched is dropped; a request for a different identity supersedes the
//! running fetch. Every fetch result is tagged with a [`Generation`](shamba_actor::Generation)
//! and results from a superseded or cancelled fetch are ignored.
//!
//! ## Structure
//!
//! - [`machine`] - the [`SessionResolver`] state machine
//! - [`messages`] - commands, replies, events and the published [`SessionSnapshot`]
//! - [`error`] - [`SessionError`]
//! - [`new()`] - factory returning the actor and its [`SessionClient`]
//!
//! ## Usage
//!
//! ```rust
//! use shamba_client::api::MockMarketApi;
//! use shamba_client::auth::LocalAuthProvider;
//! use shamba_client::model::Session;
//! use shamba_client::session_actor::{self, SessionContext};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let auth = Arc::new(LocalAuthProvider::with_session(Session::new(
//!         "u1",
//!         "amina@example.com",
//!         "jwt",
//!     )));
//!     let api = Arc::new(MockMarketApi::new());
//!     api.expect_get_me().never_resolve();
//!
//!     let (actor, client) = session_actor::new(Duration::from_millis(50));
//!     tokio::spawn(actor.run(SessionContext { auth, api }));
//!
//!     client.initialize().await?;
//!     let settled = client.wait_until_settled().await?;
//!     assert!(settled.profile.unwrap().fallback);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod machine;
pub mod messages;

pub use error::*;
pub use machine::*;
pub use messages::*;

use crate::clients::SessionClient;
use shamba_actor::MachineActor;
use std::time::Duration;

/// Advisory published when the profile had to be synthesized from the session.
pub const FALLBACK_ADVISORY: &str = "Using cached profile (backend slow)";

/// Advisory published when the identity provider could not produce a session.
pub const SESSION_UNAVAILABLE: &str = "Failed to get authentication session";

/// Creates a Session Resolver actor and its client.
///
/// `profile_deadline` bounds each profile fetch.
pub fn new(profile_deadline: Duration) -> (MachineActor<SessionResolver>, SessionClient) {
    let (actor, client) = MachineActor::new(SessionResolver::new(profile_deadline), 32);
    (actor, SessionClient::new(client))
}
