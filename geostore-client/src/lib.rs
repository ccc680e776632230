//! Transport layer for the geostore search backend.
//!
//! This crate is the collaborator seam between the collection layer and the
//! remote store. It defines:
//!
//! - [`SearchBackend`]: the async trait every backend implementation
//!   satisfies (search, bucket aggregation, aggregate-compute, blob access,
//!   point-in-time handling). Collections are written against this trait,
//!   so tests can drive them with an in-memory backend.
//! - [`HttpSearchBackend`]: the production implementation over HTTP.
//! - [`ClientConfig`]: endpoint, bearer token and timeout configuration.
//!
//! No retry policy lives here or above: a failed call maps to a
//! [`ClientError`] and propagates unmodified to the caller.

mod backend;
mod config;
mod error;
mod http;

pub use backend::SearchBackend;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::HttpSearchBackend;
