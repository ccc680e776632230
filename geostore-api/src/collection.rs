//! Cursor-paginated document collections.
//!
//! [`DocumentCollection`] is the pagination engine under every collection
//! type. It owns the resolved query for its scope and pulls pages from the
//! search endpoint on demand, growing an in-order buffer only as far as the
//! caller's access pattern requires.
//!
//! The collection moves through three phases:
//!
//! 1. **Uninitialized**: nothing fetched, total unknown. The first fetch
//!    asks the backend to compute the exact total hit count.
//! 2. **Paging**: total known, cursor set to the last hit's sort key. Each
//!    further fetch resumes after the cursor.
//! 3. **Exhausted**: a fetch returned fewer hits than requested (or none).
//!    Zero returned hits is the natural end of results, not an error.
//!
//! The total is captured once and never re-queried. If the underlying result
//! set mutates server-side while paging, the client does not detect it
//! beyond the stalled-growth check in [`DocumentCollection::get`]; this is
//! an accepted staleness window. Point-in-time tokens exist to close it.

use geostore_client::{ClientError, SearchBackend};
use geostore_search_protocol::{
    Clause, Hit, Pit, QueryFragment, SearchRequest, SortField, TermsAgg, DEFAULT_BUCKET_SIZE,
    DEFAULT_PAGE_SIZE,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ExplorerError, Result};
use crate::metadata::paths;

/// Internal backend sequence key used as the stable page sort.
const SEQUENCE_FIELD: &str = "_doc";

/// A lazily-paginated collection of raw documents.
///
/// Fetching operations take `&mut self` because they advance the cursor and
/// grow the buffer in place; a collection that is not actively paginating is
/// freely shareable for reads. Filtered derivatives are independent
/// instances with fresh pagination and cache state, which is the intended
/// mechanism for concurrent exploration.
pub struct DocumentCollection {
    backend: Arc<dyn SearchBackend>,
    query: QueryFragment,
    select: Option<Vec<String>>,
    pit: Option<Pit>,

    cursor: Option<Vec<JsonValue>>,
    total: Option<usize>,
    items: Vec<Hit>,
    position: usize,
    field_values: HashMap<String, Vec<JsonValue>>,
}

impl DocumentCollection {
    /// Collection over all documents of `doc_type`, projected down to
    /// `select`. Narrowing happens through [`filtered`](Self::filtered).
    pub(crate) fn new(
        backend: Arc<dyn SearchBackend>,
        doc_type: &str,
        select: Option<Vec<String>>,
        pit: Option<Pit>,
    ) -> Self {
        Self {
            backend,
            query: QueryFragment::must(Clause::term(paths::CLASS, doc_type)),
            select,
            pit,
            cursor: None,
            total: None,
            items: Vec::new(),
            position: 0,
            field_values: HashMap::new(),
        }
    }

    /// New collection over this one's query composed with `addition`.
    ///
    /// Pagination state, buffer and caches all start fresh; the receiver is
    /// untouched and remains valid.
    pub(crate) fn filtered(&self, addition: &QueryFragment) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            query: self.query.compose(addition),
            select: self.select.clone(),
            pit: self.pit.clone(),
            cursor: None,
            total: None,
            items: Vec::new(),
            position: 0,
            field_values: HashMap::new(),
        }
    }

    /// The resolved query for this collection's scope.
    pub fn query(&self) -> &QueryFragment {
        &self.query
    }

    pub(crate) fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    pub(crate) fn pit(&self) -> Option<&Pit> {
        self.pit.as_ref()
    }

    /// Number of already-fetched documents.
    pub fn buffered(&self) -> usize {
        self.items.len()
    }

    /// Total number of matching documents.
    ///
    /// Resolved by the first page fetch and fixed from then on.
    pub async fn length(&mut self) -> Result<usize> {
        if self.total.is_none() {
            self.next_batch().await?;
        }
        // next_batch either set the total or failed
        Ok(self.total.unwrap_or(0))
    }

    /// The document at `index`, fetching pages as needed.
    ///
    /// Fails with [`ExplorerError::OutOfRange`] when `index` is at or beyond
    /// the resolved total, and also when page fetches stop yielding new
    /// documents before the buffer reaches `index` (the learned total can
    /// overshoot reality if the backend result set shrank underneath us).
    pub async fn get(&mut self, index: usize) -> Result<&Hit> {
        let size = self.length().await?;
        if index >= size {
            return Err(ExplorerError::OutOfRange { index, size });
        }

        while self.items.len() <= index {
            let buffered = self.items.len();
            self.next_batch().await?;
            if self.items.len() == buffered {
                return Err(ExplorerError::OutOfRange { index, size });
            }
        }

        Ok(&self.items[index])
    }

    /// Next document in traversal order, or `None` at the end.
    pub async fn next_doc(&mut self) -> Result<Option<Hit>> {
        if self.position >= self.length().await? {
            return Ok(None);
        }
        let index = self.position;
        let hit = self.get(index).await?.clone();
        self.position += 1;
        Ok(Some(hit))
    }

    /// Restart traversal from the first document.
    ///
    /// Already-fetched pages stay buffered, so re-iteration replays the same
    /// documents without new fetches.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Distinct values of `field` across the collection's scope.
    ///
    /// Computed via a backend terms aggregation over this collection's query
    /// composed with `extra`, and cached per field name for the lifetime of
    /// this instance. The cache key is the field name alone: callers must
    /// not pass the same field with a different `extra` and expect a second
    /// cache slot. `use_string_key` selects the backend's string-formatted
    /// bucket key (used for timestamp fields), falling back to the raw key
    /// when no formatted form is provided.
    pub(crate) async fn field_values(
        &mut self,
        field: &str,
        extra: Option<&QueryFragment>,
        use_string_key: bool,
    ) -> Result<Vec<JsonValue>> {
        if !self.field_values.contains_key(field) {
            let query = match extra {
                Some(extra) => self.query.compose(extra),
                None => self.query.clone(),
            };

            let mut request = SearchRequest::new(query)
                .with_size(0)
                .with_agg(field, TermsAgg::new(field, DEFAULT_BUCKET_SIZE));
            if let Some(pit) = &self.pit {
                request = request.with_pit(pit.clone());
            }

            let response = self.backend.search(&request).await?;
            let buckets = response
                .aggregations
                .get(field)
                .map(|list| list.buckets.as_slice())
                .unwrap_or(&[]);

            let values = buckets
                .iter()
                .map(|bucket| {
                    if use_string_key {
                        bucket
                            .key_as_string
                            .clone()
                            .map(JsonValue::String)
                            .unwrap_or_else(|| bucket.key.clone())
                    } else {
                        bucket.key.clone()
                    }
                })
                .collect();

            debug!(field = %field, "field values fetched");
            self.field_values.insert(field.to_string(), values);
        }

        Ok(self.field_values[field].clone())
    }

    /// [`field_values`](Self::field_values) narrowed to string values.
    pub(crate) async fn field_strings(&mut self, field: &str) -> Result<Vec<String>> {
        let values = self.field_values(field, None, false).await?;
        Ok(values
            .into_iter()
            .map(|value| match value {
                JsonValue::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    /// Fetch the next page and fold it into the buffer.
    async fn next_batch(&mut self) -> Result<()> {
        let mut request = SearchRequest::new(self.query.clone())
            .with_sort(SortField::descending(SEQUENCE_FIELD))
            .with_size(DEFAULT_PAGE_SIZE);

        if let Some(select) = &self.select {
            request = request.with_source(select.clone());
        }
        if self.total.is_none() {
            request = request.with_track_total_hits(true);
        }
        if let Some(cursor) = &self.cursor {
            request = request.with_search_after(cursor.clone());
        }
        if let Some(pit) = &self.pit {
            request = request.with_pit(pit.clone());
        }

        let response = self.backend.search(&request).await?;

        if self.total.is_none() {
            let total = response
                .hits
                .total
                .as_ref()
                .map(|total| total.value as usize)
                .ok_or_else(|| {
                    ClientError::InvalidResponse(
                        "search response missing total hit count".to_string(),
                    )
                })?;
            self.total = Some(total);
        }

        let hits = response.hits.hits;
        debug!(
            fetched = hits.len(),
            buffered = self.items.len(),
            "page fetched"
        );

        if let Some(last) = hits.last() {
            self.cursor = Some(last.sort.clone());
            self.items.extend(hits);
        }

        Ok(())
    }
}
