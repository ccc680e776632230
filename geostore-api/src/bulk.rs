//! Bulk id listing.
//!
//! Aggregation inputs need the full matching id set, not a 500-item page, so
//! they are resolved with a dedicated cursor sweep projected down to `_id`
//! instead of going through a collection's paginator.

use geostore_client::SearchBackend;
use geostore_search_protocol::{
    Pit, QueryFragment, SearchRequest, SortField, DEFAULT_PAGE_SIZE,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;

/// Ids of every document matching `query`, in backend order.
pub(crate) async fn list_object_ids(
    backend: &Arc<dyn SearchBackend>,
    query: &QueryFragment,
    pit: Option<&Pit>,
) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut cursor: Option<Vec<JsonValue>> = None;

    loop {
        let mut request = SearchRequest::new(query.clone())
            .with_sort(SortField::descending("_doc"))
            .with_size(DEFAULT_PAGE_SIZE)
            .with_source(vec!["_id".to_string()]);
        if let Some(cursor) = cursor.take() {
            request = request.with_search_after(cursor);
        }
        if let Some(pit) = pit {
            request = request.with_pit(pit.clone());
        }

        let response = backend.search(&request).await?;
        let hits = response.hits.hits;
        let Some(last) = hits.last() else {
            break;
        };

        cursor = Some(last.sort.clone());
        let page_len = hits.len();
        ids.extend(hits.into_iter().map(|hit| hit.id));

        if page_len < DEFAULT_PAGE_SIZE {
            break;
        }
    }

    debug!(count = ids.len(), "object ids listed");
    Ok(ids)
}
