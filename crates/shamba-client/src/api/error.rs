use crate::auth::AuthError;
use thiserror::Error;

/// Failures of a backend call, with the user-facing message as `Display`.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error. Check if backend is running at {base_url}")]
    Network { base_url: String },
    #[error("Authentication failed. Please log in again.")]
    Unauthorized,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Server error. Please try again later.")]
    Server { status: u16 },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("No reply scripted for {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Maps a non-success HTTP status. `message` is the backend's `message` field, if any.
    pub fn from_status(status: u16, path: &str, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound(path.to_string()),
            500..=599 => ApiError::Server { status },
            _ => ApiError::Status {
                status,
                message: message.unwrap_or_else(|| format!("Request failed with status {status}")),
            },
        }
    }

    pub(crate) fn from_transport(error: &reqwest::Error, base_url: &str) -> Self {
        if error.is_timeout() {
            ApiError::Timeout
        } else if error.is_connect() {
            ApiError::Network {
                base_url: base_url.to_string(),
            }
        } else if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Client(error.to_string())
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server { status } | ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_messages() {
        assert_eq!(
            ApiError::from_status(401, "/users/me", None).to_string(),
            "Authentication failed. Please log in again."
        );
        assert_eq!(
            ApiError::from_status(404, "/products/p1", None).to_string(),
            "Resource not found: /products/p1"
        );
        assert_eq!(
            ApiError::from_status(503, "/orders", Some("down".to_string())).to_string(),
            "Server error. Please try again later."
        );
        assert_eq!(
            ApiError::from_status(400, "/orders", Some("Insufficient stock".to_string()))
                .to_string(),
            "Insufficient stock"
        );
        assert_eq!(ApiError::from_status(409, "/orders", None).status(), Some(409));
    }

    #[test]
    fn test_network_message_names_base_url() {
        let error = ApiError::Network {
            base_url: "http://localhost:5000/api".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Network error. Check if backend is running at http://localhost:5000/api"
        );
    }
}
