//! Case-scoped collections of child objects.
//!
//! A [`ChildCollection`] wraps the cursor paginator with the child-object
//! filter vocabulary and scopes every query to one parent case. It is
//! generic over the value-object type produced by indexing, so the surface,
//! cube and polygons collections all share one implementation.

use geostore_client::SearchBackend;
use geostore_search_protocol::{Clause, Hit, Pit, QueryFragment};
use serde_json::Value as JsonValue;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::collection::DocumentCollection;
use crate::error::Result;
use crate::metadata::{paths, CHILD_FIELDS};
use crate::time::TimeFilter;

/// A value object constructible from one returned document.
pub trait ChildObject: Sized {
    /// Backend document class of this object type.
    const DOC_TYPE: &'static str;

    /// Wrap a hit, validating its metadata body.
    fn from_hit(backend: Arc<dyn SearchBackend>, hit: Hit) -> Result<Self>;
}

/// One optional property constraint.
///
/// Mirrors the three argument shapes a filter accepts: a scalar (exact
/// match), a list (match any) and a boolean (field presence). Presence
/// filtering is how aggregated objects are told apart from raw realizations:
/// aggregated objects carry an aggregation-operation field that realizations
/// lack.
#[derive(Debug, Clone, PartialEq)]
pub enum PropFilter {
    /// Exact-match on one value.
    Eq(JsonValue),
    /// Match any of the listed values.
    AnyOf(Vec<JsonValue>),
    /// Require the field present (`true`) or absent (`false`).
    Exists(bool),
}

impl PropFilter {
    /// Translate into clauses on `field`, appended to `fragment`.
    pub(crate) fn apply(&self, field: &str, fragment: QueryFragment) -> QueryFragment {
        match self {
            PropFilter::Eq(value) => fragment.with_must(Clause::term(field, value.clone())),
            PropFilter::AnyOf(values) => {
                fragment.with_must(Clause::terms(field, values.clone()))
            }
            PropFilter::Exists(true) => fragment.with_must(Clause::exists(field)),
            PropFilter::Exists(false) => fragment.with_must_not(Clause::exists(field)),
        }
    }
}

impl From<&str> for PropFilter {
    fn from(value: &str) -> Self {
        PropFilter::Eq(JsonValue::from(value))
    }
}

impl From<String> for PropFilter {
    fn from(value: String) -> Self {
        PropFilter::Eq(JsonValue::from(value))
    }
}

impl From<i64> for PropFilter {
    fn from(value: i64) -> Self {
        PropFilter::Eq(JsonValue::from(value))
    }
}

impl From<bool> for PropFilter {
    fn from(value: bool) -> Self {
        PropFilter::Exists(value)
    }
}

impl From<Vec<&str>> for PropFilter {
    fn from(values: Vec<&str>) -> Self {
        PropFilter::AnyOf(values.into_iter().map(JsonValue::from).collect())
    }
}

impl From<Vec<String>> for PropFilter {
    fn from(values: Vec<String>) -> Self {
        PropFilter::AnyOf(values.into_iter().map(JsonValue::from).collect())
    }
}

impl From<Vec<i64>> for PropFilter {
    fn from(values: Vec<i64>) -> Self {
        PropFilter::AnyOf(values.into_iter().map(JsonValue::from).collect())
    }
}

/// Filter arguments for child collections.
///
/// Every field is optional; absent fields contribute no clause. Built with
/// `with_*` setters, each accepting a scalar, a list or a boolean through
/// [`PropFilter`]'s `From` impls.
///
/// # Example
///
/// ```rust
/// use geostore_api::ChildFilter;
///
/// // raw iter-0 realizations of one horizon
/// let filter = ChildFilter::new()
///     .with_iteration("iter-0")
///     .with_name("Valysar Fm.")
///     .with_aggregation(false);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildFilter {
    pub name: Option<PropFilter>,
    pub tagname: Option<PropFilter>,
    pub iteration: Option<PropFilter>,
    pub realization: Option<PropFilter>,
    pub aggregation: Option<PropFilter>,
    pub stage: Option<PropFilter>,
    pub column: Option<PropFilter>,
    pub uuid: Option<PropFilter>,
    pub stratigraphic: Option<PropFilter>,
    pub vertical_domain: Option<PropFilter>,
    pub time: Option<TimeFilter>,
}

impl ChildFilter {
    /// Empty filter (matches everything in scope).
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the object name.
    pub fn with_name(mut self, name: impl Into<PropFilter>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Constrain the object tagname.
    pub fn with_tagname(mut self, tagname: impl Into<PropFilter>) -> Self {
        self.tagname = Some(tagname.into());
        self
    }

    /// Constrain the iteration name.
    pub fn with_iteration(mut self, iteration: impl Into<PropFilter>) -> Self {
        self.iteration = Some(iteration.into());
        self
    }

    /// Constrain the realization id.
    pub fn with_realization(mut self, realization: impl Into<PropFilter>) -> Self {
        self.realization = Some(realization.into());
        self
    }

    /// Constrain the aggregation operation (or its presence).
    pub fn with_aggregation(mut self, aggregation: impl Into<PropFilter>) -> Self {
        self.aggregation = Some(aggregation.into());
        self
    }

    /// Constrain the context stage.
    pub fn with_stage(mut self, stage: impl Into<PropFilter>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Constrain the spec column names (tabular objects).
    pub fn with_column(mut self, column: impl Into<PropFilter>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Constrain the object uuid.
    pub fn with_uuid(mut self, uuid: impl Into<PropFilter>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    /// Constrain the stratigraphic flag.
    pub fn with_stratigraphic(mut self, stratigraphic: impl Into<PropFilter>) -> Self {
        self.stratigraphic = Some(stratigraphic.into());
        self
    }

    /// Constrain the vertical domain.
    pub fn with_vertical_domain(mut self, vertical_domain: impl Into<PropFilter>) -> Self {
        self.vertical_domain = Some(vertical_domain.into());
        self
    }

    /// Constrain the time range.
    pub fn with_time(mut self, time: TimeFilter) -> Self {
        self.time = Some(time);
        self
    }

    /// Translate into one query fragment.
    pub(crate) fn to_query(&self) -> QueryFragment {
        let props: [(&str, &Option<PropFilter>); 10] = [
            (paths::NAME, &self.name),
            (paths::TAGNAME, &self.tagname),
            (paths::ITERATION, &self.iteration),
            (paths::REALIZATION, &self.realization),
            (paths::AGGREGATION, &self.aggregation),
            (paths::STAGE, &self.stage),
            (paths::COLUMN, &self.column),
            (paths::UUID, &self.uuid),
            (paths::STRATIGRAPHIC, &self.stratigraphic),
            (paths::VERTICAL_DOMAIN, &self.vertical_domain),
        ];

        let mut fragment = QueryFragment::new();
        for (field, filter) in props {
            if let Some(filter) = filter {
                fragment = filter.apply(field, fragment);
            }
        }

        if let Some(time) = &self.time {
            fragment = fragment.compose(&time.to_query());
        }

        fragment
    }
}

/// A collection of child objects scoped to one parent case.
pub struct ChildCollection<O> {
    docs: DocumentCollection,
    case_uuid: String,
    _object: PhantomData<O>,
}

impl<O: ChildObject> ChildCollection<O> {
    /// Collection over the children of `case_uuid`.
    pub(crate) fn new(
        backend: Arc<dyn SearchBackend>,
        case_uuid: impl Into<String>,
        pit: Option<Pit>,
    ) -> Self {
        let case_uuid = case_uuid.into();
        let select = CHILD_FIELDS.iter().map(|field| field.to_string()).collect();
        let scope = QueryFragment::must(Clause::term(paths::PARENT, case_uuid.as_str()));
        let docs =
            DocumentCollection::new(backend, O::DOC_TYPE, Some(select), pit).filtered(&scope);

        Self {
            docs,
            case_uuid,
            _object: PhantomData,
        }
    }

    /// Apply `filter`, returning a new narrowed collection.
    ///
    /// The receiver is untouched: its size, buffer and caches are unchanged
    /// and it remains usable as a stable reference.
    pub fn filter(&self, filter: ChildFilter) -> Self {
        Self {
            docs: self.docs.filtered(&filter.to_query()),
            case_uuid: self.case_uuid.clone(),
            _object: PhantomData,
        }
    }

    /// Total number of matching objects.
    pub async fn length(&mut self) -> Result<usize> {
        self.docs.length().await
    }

    /// Number of already-fetched documents.
    pub fn buffered(&self) -> usize {
        self.docs.buffered()
    }

    /// The object at `index`.
    pub async fn get(&mut self, index: usize) -> Result<O> {
        let hit = self.docs.get(index).await?.clone();
        O::from_hit(Arc::clone(self.docs.backend()), hit)
    }

    /// Next object in traversal order, or `None` at the end.
    pub async fn next_item(&mut self) -> Result<Option<O>> {
        match self.docs.next_doc().await? {
            Some(hit) => Ok(Some(O::from_hit(Arc::clone(self.docs.backend()), hit)?)),
            None => Ok(None),
        }
    }

    /// Restart traversal from the first object.
    pub fn rewind(&mut self) {
        self.docs.rewind();
    }

    /// The resolved query for this collection's scope.
    pub fn query(&self) -> &QueryFragment {
        self.docs.query()
    }

    /// The parent case uuid this collection is scoped to.
    pub fn case_uuid(&self) -> &str {
        &self.case_uuid
    }

    pub(crate) fn docs_mut(&mut self) -> &mut DocumentCollection {
        &mut self.docs
    }

    pub(crate) fn docs(&self) -> &DocumentCollection {
        &self.docs
    }

    /// Distinct object names.
    pub async fn names(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::NAME).await
    }

    /// Distinct object tagnames.
    pub async fn tagnames(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::TAGNAME).await
    }

    /// Distinct iteration names.
    pub async fn iterations(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::ITERATION).await
    }

    /// Distinct realization ids.
    pub async fn realizations(&mut self) -> Result<Vec<i64>> {
        let values = self.docs.field_values(paths::REALIZATION, None, false).await?;
        Ok(values.iter().filter_map(JsonValue::as_i64).collect())
    }

    /// Distinct aggregation operations.
    pub async fn aggregations(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::AGGREGATION).await
    }

    /// Distinct context stages.
    pub async fn stages(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::STAGE).await
    }

    /// Distinct stratigraphic flags.
    pub async fn stratigraphic_markers(&mut self) -> Result<Vec<bool>> {
        let values = self
            .docs
            .field_values(paths::STRATIGRAPHIC, None, false)
            .await?;
        Ok(values.iter().filter_map(JsonValue::as_bool).collect())
    }

    /// Distinct vertical domains.
    pub async fn vertical_domains(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::VERTICAL_DOMAIN).await
    }
}
