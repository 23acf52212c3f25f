use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Cannot poll payment without an order id")]
    MissingOrderId,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for PaymentError {
    fn from(s: String) -> Self {
        PaymentError::ActorCommunicationError(s)
    }
}
