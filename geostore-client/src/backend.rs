//! The backend trait consumed by the collection layer.

use async_trait::async_trait;
use bytes::Bytes;
use geostore_search_protocol::{AggregateRequest, Pit, SearchRequest, SearchResponse};

use crate::error::Result;

/// Interface to the remote search/store backend.
///
/// Every suspension point in the client stack goes through one of these
/// methods; everything above them is pure in-process computation. The
/// production implementation is [`HttpSearchBackend`](crate::HttpSearchBackend);
/// tests substitute an in-memory backend evaluating queries over a fixture
/// document set.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search request (paged hits and/or bucket aggregations).
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    /// Compute a server-side aggregation over an explicit document id set.
    ///
    /// Returns the raw binary artifact; decoding is the caller's concern.
    async fn aggregate(&self, request: &AggregateRequest) -> Result<Bytes>;

    /// Fetch the binary payload of one stored object.
    async fn fetch_blob(&self, object_id: &str) -> Result<Bytes>;

    /// Resolve a temporary signed URL for one stored object.
    ///
    /// The returned string carries the signed query after a `?` delimiter.
    async fn blob_auth_uri(&self, object_id: &str) -> Result<String>;

    /// Open a point-in-time snapshot with the given keep-alive lifetime.
    async fn open_pit(&self, keep_alive: &str) -> Result<Pit>;
}
