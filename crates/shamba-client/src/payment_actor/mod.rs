//! # Payment Confirmation Poller
//!
//! Watches an order after an STK push until its payment settles.
//!
//! ## Overview
//!
//! `start(order_id)` checks `GET /payments/status/:orderId` on every tick of an owned
//! interval (3 s by default), for at most 40 attempts:
//!
//! - `Paid` stops the interval, reports [`PollState::Confirmed`] and schedules a one-time
//!   refresh of the order list 2 s later.
//! - `Payment Failed` stops the interval and reports [`PollState::Failed`].
//! - Anything else, including transport errors, keeps polling.
//! - The tick after the last attempt reports [`PollState::TimedOut`].
//!
//! At most one poll is active: starting again cancels the previous interval first. At most
//! one status check is outstanding; a tick that finds the previous check still running only
//! counts the attempt.
//!
//! ## Structure
//!
//! - [`machine`] - the [`PaymentPoller`] state machine
//! - [`messages`] - commands, events, [`PollState`] and the published [`PollSnapshot`]
//! - [`error`] - [`PaymentError`]
//! - [`new()`] - factory returning the actor and its [`PaymentClient`]

pub mod error;
pub mod machine;
pub mod messages;

pub use error::*;
pub use machine::*;
pub use messages::*;

use crate::clients::PaymentClient;
use crate::config::PollerConfig;
use shamba_actor::MachineActor;

pub const TIMEOUT_ADVISORY: &str =
    "Payment verification timed out. Please check \"My Orders\" for status.";

pub const FAILED_ADVISORY: &str = "Payment failed. Please try again or check My Orders.";

/// Creates a Payment Poller actor and its client.
pub fn new(config: PollerConfig) -> (MachineActor<PaymentPoller>, PaymentClient) {
    let (actor, client) = MachineActor::new(PaymentPoller::new(config), 32);
    (actor, PaymentClient::new(client))
}
