//! Surface objects and their collection.

use bytes::Bytes;
use geostore_client::SearchBackend;
use geostore_search_protocol::{
    AggregateRequest, Clause, Hit, Pit, QueryFragment, SearchRequest, TermsAgg,
};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use tracing::debug;

use crate::bulk;
use crate::child::{ChildCollection, ChildFilter, ChildObject};
use crate::error::Result;
use crate::metadata::paths;
use crate::objects::child::Child;

/// Bucket count for the interval enumeration aggregation.
const INTERVAL_BUCKETS: usize = 50;

/// A depth or time surface stored in a case.
///
/// The payload (`blob()`) is the surface in its storage format; decoding it
/// is left to domain tooling.
#[derive(Debug, Clone)]
pub struct Surface {
    child: Child,
}

impl ChildObject for Surface {
    const DOC_TYPE: &'static str = "surface";

    fn from_hit(backend: Arc<dyn SearchBackend>, hit: Hit) -> Result<Self> {
        Ok(Self {
            child: Child::from_hit(backend, hit)?,
        })
    }
}

impl Deref for Surface {
    type Target = Child;

    fn deref(&self) -> &Child {
        &self.child
    }
}

/// Query fragment selecting single-timestamp documents.
fn timestamp_scope() -> QueryFragment {
    QueryFragment::must(Clause::exists(paths::TIME_T0))
        .with_must_not(Clause::exists(paths::TIME_T1))
}

/// The surfaces of one case, filterable and lazily paginated.
///
/// On top of the shared child-collection behavior this adds the server-side
/// statistical aggregations (mean, min, max, std, percentiles) over the
/// currently filtered document set, plus derived time listings.
pub struct SurfaceCollection {
    inner: ChildCollection<Surface>,
    aggregation_cache: HashMap<String, Bytes>,
}

impl SurfaceCollection {
    pub(crate) fn new(
        backend: Arc<dyn SearchBackend>,
        case_uuid: impl Into<String>,
        pit: Option<Pit>,
    ) -> Self {
        Self {
            inner: ChildCollection::new(backend, case_uuid, pit),
            aggregation_cache: HashMap::new(),
        }
    }

    /// Apply `filter`, returning a new narrowed collection.
    ///
    /// The new instance starts with fresh pagination state and an empty
    /// aggregation cache; the receiver is untouched.
    pub fn filter(&self, filter: ChildFilter) -> Self {
        Self {
            inner: self.inner.filter(filter),
            aggregation_cache: HashMap::new(),
        }
    }

    /// Total number of matching surfaces.
    pub async fn length(&mut self) -> Result<usize> {
        self.inner.length().await
    }

    /// Number of already-fetched documents.
    pub fn buffered(&self) -> usize {
        self.inner.buffered()
    }

    /// The surface at `index`.
    pub async fn get(&mut self, index: usize) -> Result<Surface> {
        self.inner.get(index).await
    }

    /// Next surface in traversal order, or `None` at the end.
    pub async fn next_item(&mut self) -> Result<Option<Surface>> {
        self.inner.next_item().await
    }

    /// Restart traversal from the first surface.
    pub fn rewind(&mut self) {
        self.inner.rewind();
    }

    /// The resolved query for this collection's scope.
    pub fn query(&self) -> &QueryFragment {
        self.inner.query()
    }

    /// Distinct surface names.
    pub async fn names(&mut self) -> Result<Vec<String>> {
        self.inner.names().await
    }

    /// Distinct surface tagnames.
    pub async fn tagnames(&mut self) -> Result<Vec<String>> {
        self.inner.tagnames().await
    }

    /// Distinct iteration names.
    pub async fn iterations(&mut self) -> Result<Vec<String>> {
        self.inner.iterations().await
    }

    /// Distinct realization ids.
    pub async fn realizations(&mut self) -> Result<Vec<i64>> {
        self.inner.realizations().await
    }

    /// Distinct aggregation operations.
    pub async fn aggregations(&mut self) -> Result<Vec<String>> {
        self.inner.aggregations().await
    }

    /// Distinct context stages.
    pub async fn stages(&mut self) -> Result<Vec<String>> {
        self.inner.stages().await
    }

    /// Distinct stratigraphic flags.
    pub async fn stratigraphic_markers(&mut self) -> Result<Vec<bool>> {
        self.inner.stratigraphic_markers().await
    }

    /// Distinct vertical domains.
    pub async fn vertical_domains(&mut self) -> Result<Vec<String>> {
        self.inner.vertical_domains().await
    }

    /// Distinct timestamps of single-timestamp surfaces, formatted.
    pub async fn timestamps(&mut self) -> Result<Vec<String>> {
        let scope = timestamp_scope();
        let values = self
            .inner
            .docs_mut()
            .field_values(paths::TIME_T0, Some(&scope), true)
            .await?;
        Ok(values
            .into_iter()
            .map(|value| match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    /// Distinct (t0, t1) intervals, enumerated via a nested aggregation
    /// rather than by walking documents.
    pub async fn intervals(&mut self) -> Result<Vec<(String, String)>> {
        let mut request = SearchRequest::new(self.inner.query().clone())
            .with_size(0)
            .with_agg(
                "t0",
                TermsAgg::new(paths::TIME_T0, INTERVAL_BUCKETS)
                    .with_sub("t1", TermsAgg::new(paths::TIME_T1, INTERVAL_BUCKETS)),
            );
        if let Some(pit) = self.inner.docs().pit() {
            request = request.with_pit(pit.clone());
        }

        let response = self.inner.docs().backend().search(&request).await?;
        let mut intervals = Vec::new();

        if let Some(outer) = response.aggregations.get("t0") {
            for t0_bucket in &outer.buckets {
                let t0 = t0_bucket
                    .key_as_string
                    .clone()
                    .unwrap_or_else(|| t0_bucket.key.to_string());
                if let Some(inner) = t0_bucket.sub.get("t1") {
                    for t1_bucket in &inner.buckets {
                        let t1 = t1_bucket
                            .key_as_string
                            .clone()
                            .unwrap_or_else(|| t1_bucket.key.to_string());
                        intervals.push((t0.clone(), t1));
                    }
                }
            }
        }

        Ok(intervals)
    }

    /// Compute (or reuse) the aggregation artifact for `operation`.
    ///
    /// The id set feeding the aggregation is the full unpaginated match of
    /// the current query, resolved by a bulk id sweep. The artifact is
    /// cached per operation for this instance's lifetime, so repeating an
    /// operation issues no second backend call.
    async fn aggregate(&mut self, operation: &str) -> Result<Bytes> {
        if !self.aggregation_cache.contains_key(operation) {
            let docs = self.inner.docs();
            let ids =
                bulk::list_object_ids(docs.backend(), docs.query(), docs.pit()).await?;
            debug!(operation = %operation, ids = ids.len(), "surface aggregation");

            let payload = docs
                .backend()
                .aggregate(&AggregateRequest::new(operation, ids))
                .await?;
            self.aggregation_cache
                .insert(operation.to_string(), payload);
        }

        Ok(self.aggregation_cache[operation].clone())
    }

    /// Mean surface over the filtered set.
    pub async fn mean(&mut self) -> Result<Bytes> {
        self.aggregate("mean").await
    }

    /// Minimum surface over the filtered set.
    pub async fn min(&mut self) -> Result<Bytes> {
        self.aggregate("min").await
    }

    /// Maximum surface over the filtered set.
    pub async fn max(&mut self) -> Result<Bytes> {
        self.aggregate("max").await
    }

    /// Standard-deviation surface over the filtered set.
    pub async fn std(&mut self) -> Result<Bytes> {
        self.aggregate("std").await
    }

    /// 10th-percentile surface over the filtered set.
    pub async fn p10(&mut self) -> Result<Bytes> {
        self.aggregate("p10").await
    }

    /// 50th-percentile surface over the filtered set.
    pub async fn p50(&mut self) -> Result<Bytes> {
        self.aggregate("p50").await
    }

    /// 90th-percentile surface over the filtered set.
    pub async fn p90(&mut self) -> Result<Bytes> {
        self.aggregate("p90").await
    }
}
