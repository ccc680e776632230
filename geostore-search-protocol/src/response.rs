//! Search response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Response envelope from the backend `/search` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The hit envelope (total plus the page of hits).
    pub hits: HitsEnvelope,

    /// Named bucket aggregation results, when the request carried `aggs`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aggregations: BTreeMap<String, BucketList>,
}

/// Total count plus the ordered page of hits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitsEnvelope {
    /// Exact total hit count. Present only when the request asked for it
    /// via `track_total_hits`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<TotalHits>,

    /// Hits in backend sort order.
    pub hits: Vec<Hit>,
}

/// The backend's total-hit report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

/// One returned document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Stable document identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// The (possibly projected) metadata body.
    #[serde(rename = "_source", default)]
    pub source: JsonValue,

    /// The hit's sort key. Feeds the next request's `search_after` cursor.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<JsonValue>,
}

/// The bucket array of one named aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketList {
    pub buckets: Vec<Bucket>,
}

/// One bucket of a terms aggregation.
///
/// Nested sub-aggregations appear as additional keys on the bucket object,
/// captured here in `sub` by aggregation name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// The distinct field value this bucket groups.
    pub key: JsonValue,

    /// Backend-formatted rendering of `key` (e.g. an ISO timestamp for an
    /// epoch-millis key).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_as_string: Option<String>,

    /// Number of documents in the bucket.
    #[serde(default)]
    pub doc_count: u64,

    /// Nested sub-aggregation buckets, by aggregation name.
    #[serde(flatten)]
    pub sub: BTreeMap<String, BucketList>,
}

impl Bucket {
    /// Bucket over `key` with `doc_count` documents.
    pub fn new(key: impl Into<JsonValue>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            key_as_string: None,
            doc_count,
            sub: BTreeMap::new(),
        }
    }

    /// Set the string-formatted key.
    pub fn with_key_as_string(mut self, key: impl Into<String>) -> Self {
        self.key_as_string = Some(key.into());
        self
    }

    /// Attach nested sub-buckets under `name`.
    pub fn with_sub(mut self, name: impl Into<String>, buckets: Vec<Bucket>) -> Self {
        self.sub.insert(name.into(), BucketList { buckets });
        self
    }
}
