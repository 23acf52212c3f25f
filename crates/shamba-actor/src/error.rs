//! # Framework Errors
//!
//! Common error types used throughout the actor framework. Machines keep their own
//! error enums; the framework boxes them into [`FrameworkError::MachineError`] on the way
//! back to the client.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Machine error: {0}")]
    MachineError(Box<dyn std::error::Error + Send + Sync>),
}
