//! Search and aggregate request envelopes.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::pit::Pit;
use crate::query::QueryFragment;
use crate::DEFAULT_PAGE_SIZE;

/// Sort direction for a [`SortField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One entry of the request `sort` array.
///
/// Serializes to the backend's `{"<field>": {"order": "<order>"}}` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

impl SortField {
    /// Ascending sort on `field`.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Order {
            order: SortOrder,
        }
        let mut state = serializer.serialize_map(Some(1))?;
        state.serialize_entry(&self.field, &Order { order: self.order })?;
        state.end()
    }
}

/// A terms aggregation, optionally nested.
///
/// Nested aggregations produce sub-buckets keyed by the nested aggregation
/// name inside each outer bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsAgg {
    pub terms: TermsSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggs: Option<BTreeMap<String, TermsAgg>>,
}

/// Field and bucket-count spec of a terms aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsSpec {
    pub field: String,
    pub size: usize,
}

impl TermsAgg {
    /// Terms aggregation over `field` returning up to `size` buckets.
    pub fn new(field: impl Into<String>, size: usize) -> Self {
        Self {
            terms: TermsSpec {
                field: field.into(),
                size,
            },
            aggs: None,
        }
    }

    /// Nest a sub-aggregation under `name`.
    pub fn with_sub(mut self, name: impl Into<String>, agg: TermsAgg) -> Self {
        self.aggs
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), agg);
        self
    }
}

/// Search request envelope for the backend `/search` endpoint.
///
/// # Semantics
///
/// - **`search_after`**: cursor from the previous page's last hit. Omitted on
///   the first fetch of a collection.
/// - **`track_total_hits`**: asks the backend to compute the exact total hit
///   count. Sent on the first fetch only; the learned total is never
///   re-queried.
/// - **`pit`**: point-in-time token isolating the whole pagination run from
///   concurrent index mutation. Attached to every fetch when configured.
/// - **`source`**: field projection whitelist, reducing payload size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// The resolved query for this request.
    pub query: QueryFragment,

    /// Stable sort ensuring a deterministic page order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,

    /// Page size (number of hits requested).
    pub size: usize,

    /// Cursor token from the previous page's last hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<Vec<JsonValue>>,

    /// Request an exact total hit count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<bool>,

    /// Field projection whitelist.
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<Vec<String>>,

    /// Point-in-time token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pit: Option<Pit>,

    /// Named bucket aggregations to compute alongside (or instead of) hits.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, TermsAgg>,
}

impl SearchRequest {
    /// Request over `query` with the default page size and no cursor.
    pub fn new(query: QueryFragment) -> Self {
        Self {
            query,
            sort: Vec::new(),
            size: DEFAULT_PAGE_SIZE,
            search_after: None,
            track_total_hits: None,
            source: None,
            pit: None,
            aggs: BTreeMap::new(),
        }
    }

    /// Append a sort field.
    pub fn with_sort(mut self, sort: SortField) -> Self {
        self.sort.push(sort);
        self
    }

    /// Set the page size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the `search_after` cursor.
    pub fn with_search_after(mut self, cursor: Vec<JsonValue>) -> Self {
        self.search_after = Some(cursor);
        self
    }

    /// Ask the backend for an exact total hit count.
    pub fn with_track_total_hits(mut self, track: bool) -> Self {
        self.track_total_hits = Some(track);
        self
    }

    /// Set the field projection whitelist.
    pub fn with_source(mut self, fields: Vec<String>) -> Self {
        self.source = Some(fields);
        self
    }

    /// Attach a point-in-time token.
    pub fn with_pit(mut self, pit: Pit) -> Self {
        self.pit = Some(pit);
        self
    }

    /// Attach a named bucket aggregation.
    pub fn with_agg(mut self, name: impl Into<String>, agg: TermsAgg) -> Self {
        self.aggs.insert(name.into(), agg);
        self
    }
}

/// Request body for the backend `/aggregate` endpoint.
///
/// Submits an explicit document id set plus the operations to compute over
/// it. The response is an opaque binary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRequest {
    /// Aggregation operation names (e.g. "mean", "p90").
    pub operation: Vec<String>,
    /// Ids of the documents feeding the aggregation.
    pub object_ids: Vec<String>,
}

impl AggregateRequest {
    /// Single-operation request over `object_ids`.
    pub fn new(operation: impl Into<String>, object_ids: Vec<String>) -> Self {
        Self {
            operation: vec![operation.into()],
            object_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Clause;
    use serde_json::json;

    #[test]
    fn test_first_fetch_shape() {
        let request = SearchRequest::new(QueryFragment::must(Clause::term(
            "class.keyword",
            "surface",
        )))
        .with_sort(SortField::descending("_doc"))
        .with_track_total_hits(true);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": { "bool": { "must": [{ "term": { "class.keyword": "surface" } }] } },
                "sort": [{ "_doc": { "order": "desc" } }],
                "size": 500,
                "track_total_hits": true
            })
        );
    }

    #[test]
    fn test_cursor_fetch_omits_total_tracking() {
        let request = SearchRequest::new(QueryFragment::new())
            .with_sort(SortField::descending("_doc"))
            .with_search_after(vec![json!(42)]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["search_after"], json!([42]));
        assert!(value.get("track_total_hits").is_none());
        assert!(value.get("pit").is_none());
    }

    #[test]
    fn test_source_projection_rename() {
        let request = SearchRequest::new(QueryFragment::new())
            .with_source(vec!["_id".to_string(), "data.name".to_string()]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["_source"], json!(["_id", "data.name"]));
    }

    #[test]
    fn test_nested_aggregation_shape() {
        let request = SearchRequest::new(QueryFragment::new()).with_size(0).with_agg(
            "t0",
            TermsAgg::new("data.time.t0.value", 50)
                .with_sub("t1", TermsAgg::new("data.time.t1.value", 50)),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["aggs"]["t0"],
            json!({
                "terms": { "field": "data.time.t0.value", "size": 50 },
                "aggs": { "t1": { "terms": { "field": "data.time.t1.value", "size": 50 } } }
            })
        );
    }

    #[test]
    fn test_aggregate_request_shape() {
        let request = AggregateRequest::new("mean", vec!["a".to_string(), "b".to_string()]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "operation": ["mean"], "object_ids": ["a", "b"] })
        );
    }
}
