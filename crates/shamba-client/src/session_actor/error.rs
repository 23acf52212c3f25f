use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for SessionError {
    fn from(s: String) -> Self {
        SessionError::ActorCommunicationError(s)
    }
}
