//! Wire contract for the geostore search backend.
//!
//! This crate defines the request and response types exchanged with a
//! search-indexed document store, plus the query-fragment model shared by
//! every collection in the client stack. These types are used by:
//!
//! - The transport layer (`geostore-client`), which serializes them onto HTTP
//! - The collection layer (`geostore-api`), which builds queries incrementally
//! - Test backends, which evaluate them against in-memory document sets
//!
//! # Query model
//!
//! A [`QueryFragment`] is an immutable tree of boolean clauses. Fragments are
//! combined with [`QueryFragment::compose`], which unions the `must` and
//! `must_not` arrays of both sides rather than overwriting either. This is
//! what lets a collection narrow its scope one filter at a time without
//! re-stating prior constraints.
//!
//! # Example
//!
//! ```rust
//! use geostore_search_protocol::{Clause, QueryFragment, SearchRequest, SortField};
//!
//! let scope = QueryFragment::must(Clause::term("class.keyword", "surface"));
//! let narrowed = scope.compose(&QueryFragment::must(Clause::term(
//!     "data.name.keyword",
//!     "Valysar Fm.",
//! )));
//!
//! let request = SearchRequest::new(narrowed)
//!     .with_sort(SortField::descending("_doc"))
//!     .with_size(500)
//!     .with_track_total_hits(true);
//! ```

mod pit;
mod query;
mod request;
mod response;

pub use pit::Pit;
pub use query::{Clause, QueryFragment};
pub use request::{AggregateRequest, SearchRequest, SortField, SortOrder, TermsAgg, TermsSpec};
pub use response::{Bucket, BucketList, Hit, HitsEnvelope, SearchResponse, TotalHits};

/// Page size used by collection pagination.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Bucket count requested from terms aggregations.
pub const DEFAULT_BUCKET_SIZE: usize = 500;
