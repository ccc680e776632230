//! Error types for the collection layer.

use geostore_client::ClientError;
use thiserror::Error;

/// Errors surfaced by collections and value objects.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The requested index is at or beyond the collection's resolved size,
    /// or page fetches stalled before the buffer could reach it. Both cases
    /// look the same to the caller: the item does not exist.
    #[error("index {index} out of range for collection of size {size}")]
    OutOfRange { index: usize, size: usize },

    /// A backend request failed. Propagated unmodified; nothing in this
    /// layer retries or returns a truncated view.
    #[error("backend request failed: {0}")]
    Backend(#[from] ClientError),

    /// A decode step received an artifact format it cannot parse.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A document body failed validation against the metadata schema.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
