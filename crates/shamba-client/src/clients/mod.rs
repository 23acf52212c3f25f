//! Typed clients for the marketplace actors.

pub mod payment_client;
pub mod purchase;
pub mod session_client;

pub use payment_client::PaymentClient;
pub use purchase::{PurchaseClient, PurchaseError};
pub use session_client::SessionClient;
