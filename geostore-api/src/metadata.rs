//! Typed projection over the store's metadata schema.
//!
//! Documents come back from the search endpoint as raw JSON bodies. They are
//! validated into these structs once, at the query-response boundary, when a
//! hit is wrapped into a value object; nothing above that point reaches into
//! raw JSON by path. Every field is optional because the projection whitelist
//! and the ingest pipeline both legitimately omit parts of the schema.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{ExplorerError, Result};

/// Dotted metadata paths used in queries, filters and aggregations.
///
/// String fields carry a `.keyword` subfield for exact matching and
/// bucketing; numeric, boolean and id fields are used as-is.
pub(crate) mod paths {
    pub const CLASS: &str = "class.keyword";
    pub const PARENT: &str = "_store.parent_object.keyword";

    pub const NAME: &str = "data.name.keyword";
    pub const TAGNAME: &str = "data.tagname.keyword";
    pub const STRATIGRAPHIC: &str = "data.stratigraphic";
    pub const VERTICAL_DOMAIN: &str = "data.vertical_domain.keyword";
    pub const COLUMN: &str = "data.spec.columns.keyword";
    pub const TIME_T0: &str = "data.time.t0.value";
    pub const TIME_T1: &str = "data.time.t1.value";

    pub const ITERATION: &str = "sim.iteration.name.keyword";
    pub const REALIZATION: &str = "sim.realization.id";
    pub const AGGREGATION: &str = "sim.aggregation.operation.keyword";
    pub const STAGE: &str = "sim.context.stage.keyword";

    pub const UUID: &str = "_id";

    pub const CASE_NAME: &str = "sim.case.name.keyword";
    pub const CASE_USER: &str = "sim.case.user.id.keyword";
    pub const CASE_STATUS: &str = "_store.status.keyword";
    pub const CASE_FIELD: &str = "masterdata.field.identifier.keyword";
}

/// Projection whitelist for child-object searches.
pub(crate) const CHILD_FIELDS: &[&str] = &[
    "_id",
    "data.name",
    "data.tagname",
    "data.time",
    "data.format",
    "data.bbox",
    "data.spec",
    "data.stratigraphic",
    "data.vertical_domain",
    "sim.case.name",
    "sim.case.user.id",
    "sim.iteration.name",
    "sim.realization.id",
    "sim.context.stage",
    "sim.aggregation.operation",
    "_store.status",
    "access.asset",
    "masterdata.field",
    "file.relative_path",
];

/// Projection whitelist for case searches.
pub(crate) const CASE_FIELDS: &[&str] = &[
    "_id",
    "sim.case.name",
    "sim.case.user.id",
    "_store.status",
    "access.asset",
    "masterdata.field",
];

/// Validated metadata body of a child object (surface, cube, polygons).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub data: DataBlock,
    #[serde(default)]
    pub sim: SimBlock,
    #[serde(rename = "_store", default)]
    pub store: StoreBlock,
    #[serde(default)]
    pub file: FileBlock,
    #[serde(default)]
    pub access: AccessBlock,
    #[serde(default)]
    pub masterdata: MasterdataBlock,
}

impl ObjectMetadata {
    /// Validate a raw `_source` body.
    pub fn from_source(source: JsonValue) -> Result<Self> {
        serde_json::from_value(source)
            .map_err(|e| ExplorerError::InvalidDocument(format!("object metadata: {e}")))
    }
}

/// Validated metadata body of a case document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseMetadata {
    #[serde(default)]
    pub sim: SimBlock,
    #[serde(rename = "_store", default)]
    pub store: StoreBlock,
    #[serde(default)]
    pub access: AccessBlock,
    #[serde(default)]
    pub masterdata: MasterdataBlock,
}

impl CaseMetadata {
    /// Validate a raw `_source` body.
    pub fn from_source(source: JsonValue) -> Result<Self> {
        serde_json::from_value(source)
            .map_err(|e| ExplorerError::InvalidDocument(format!("case metadata: {e}")))
    }
}

/// The `data` block: intrinsic properties of the stored artifact.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataBlock {
    pub name: Option<String>,
    pub tagname: Option<String>,
    pub format: Option<String>,
    pub stratigraphic: Option<bool>,
    pub vertical_domain: Option<String>,
    #[serde(default)]
    pub time: TimeBlock,
    /// Spatial bounding box, passed through undecoded.
    pub bbox: Option<JsonValue>,
    /// Format-specific spec (grid geometry, column names), undecoded.
    pub spec: Option<JsonValue>,
}

/// Time range of an artifact. A timestamped artifact has `t0` only; an
/// interval artifact has both endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeBlock {
    pub t0: Option<TimePoint>,
    pub t1: Option<TimePoint>,
}

/// One endpoint of a time range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimePoint {
    pub value: Option<String>,
}

/// The `sim` block: where the artifact sits in the simulation run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimBlock {
    #[serde(default)]
    pub case: CaseRef,
    pub iteration: Option<NamedRef>,
    pub realization: Option<RealizationRef>,
    pub context: Option<ContextRef>,
    pub aggregation: Option<AggregationRef>,
}

/// Reference to the owning case.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseRef {
    pub name: Option<String>,
    #[serde(default)]
    pub user: UserRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRef {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealizationRef {
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextRef {
    pub stage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregationRef {
    pub operation: Option<String>,
}

/// Store-internal metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreBlock {
    pub parent_object: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileBlock {
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessBlock {
    pub asset: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MasterdataBlock {
    pub field: Option<FieldRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldRef {
    pub identifier: Option<String>,
}
