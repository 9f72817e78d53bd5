//! Error types for the overlay.

use thiserror::Error;

/// Result type alias using the overlay's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the overlay.
#[derive(Error, Debug)]
pub enum Error {
    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] HttpError),

    #[error("Network error: {0}")]
    Network(String),

    // Spotify Web API errors
    #[error("Invalid or expired access token")]
    Unauthorized,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),

    // Authorization flow
    #[error("Authorization failed: {0}")]
    Auth(String),

    // Local state
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP-specific errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed with status {status}: {message}")]
    StatusError { status: u16, message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Map a non-success Spotify status code to an error.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            429 => Self::RateLimited {
                retry_after_secs: None,
            },
            _ => {
                let message = body.into();
                Self::Api {
                    status,
                    message: if message.is_empty() {
                        "No error details".to_string()
                    } else {
                        message
                    },
                }
            }
        }
    }

    /// Returns true if this error is retryable.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::RateLimited { .. }
                | Self::Http(HttpError::ConnectionFailed(_) | HttpError::Timeout)
        )
    }

    /// Returns true if this is a rate limit error.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true if the access token was rejected and should be refreshed.
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
