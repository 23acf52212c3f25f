//! # Shamba Client
//!
//! Client runtime for the Shamba agricultural marketplace, where suppliers, buyers and
//! transporters trade produce. Pricing, loans, payments and order transitions are decided
//! by the backend; this crate calls it over HTTP and keeps two pieces of client state
//! honest while it does.
//!
//! ## Components
//!
//! - **[session_actor]**: resolves the identity provider's session into an application
//!   profile, degrading to a marked fallback profile when the backend is slow.
//! - **[payment_actor]**: after an STK push, polls the payment status of an order until it
//!   is confirmed, fails or times out.
//! - **[clients]**: typed clients for both actors, plus the checkout flow.
//! - **[api]**: the [`MarketApi`](api::MarketApi) seam, its `reqwest` implementation and a
//!   scripted mock.
//! - **[auth]**: the identity-provider contract and an in-memory provider.
//! - **[lifecycle]**: [`MarketSystem`](lifecycle::MarketSystem) starts, wires and stops
//!   everything.
//! - **[model]** and **[config]**: wire types and environment configuration.
//!
//! Both actors are hosted by [`shamba_actor`]; see that crate for the machine model.
//!
//! ## Testing
//!
//! Machines are tested against [`MockMarketApi`](api::MockMarketApi) on a paused clock
//! (`#[tokio::test(start_paused = true)]`); client wrappers against
//! [`shamba_actor::mock`].

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod payment_actor;
pub mod session_actor;
