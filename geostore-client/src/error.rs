//! Transport error types.

use thiserror::Error;

/// Errors from backend requests.
///
/// These bubble unmodified through the collection layer; nothing in the
/// client stack retries or suppresses them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid or incomplete client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection, timeout or other transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded as the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for backend requests.
pub type Result<T> = std::result::Result<T, ClientError>;
