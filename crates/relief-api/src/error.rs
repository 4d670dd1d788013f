//! Error types for backend requests.

use thiserror::Error;

/// Backend request errors.
///
/// Every failure of a backend call lands in one of three buckets: the request
/// never completed, the server answered with a non-success status, or the body
/// could not be read as the expected shape.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request did not complete (unreachable, refused, timed out)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a non-success status
    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not valid JSON of the expected shape
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    /// HTTP client could not be constructed
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Create an InvalidResponse error.
    pub fn invalid_response(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::InvalidResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = if body.len() > 200 {
            let mut end = 200;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &body[..end])
        } else {
            body.to_string()
        };
        ApiError::Status { status, body }
    }

    /// Check if this error is a network-level error (no usable HTTP exchange).
    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::RequestFailed(_))
    }

    /// Check if the server answered with a non-success status.
    pub fn is_status_error(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }

    /// Check if the body could not be interpreted.
    pub fn is_invalid_response(&self) -> bool {
        matches!(self, ApiError::InvalidResponse { .. })
    }

    /// HTTP status, when the server answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message.
    pub fn friendly_message(&self) -> String {
        match self {
            ApiError::RequestFailed(msg) => format!("Could not reach the backend: {msg}"),
            ApiError::Status { status: 404, .. } => "The backend does not know that alert".to_string(),
            ApiError::Status { status, .. } if *status >= 500 => {
                format!("The backend hit an internal error (HTTP {status})")
            }
            ApiError::Status { status, .. } => format!("The backend refused the request (HTTP {status})"),
            ApiError::InvalidResponse { .. } => "The backend sent an unreadable response".to_string(),
            ApiError::ConfigError(msg) => format!("Configuration error: {msg}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::invalid_response(
                e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                e.to_string(),
            )
        } else {
            ApiError::RequestFailed(e.to_string())
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, ApiError>;
