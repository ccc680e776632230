//! Shared handle for stored child objects.

use bytes::Bytes;
use geostore_client::SearchBackend;
use geostore_search_protocol::Hit;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::metadata::ObjectMetadata;

/// One stored child object (a surface, cube or polygons document).
///
/// Holds the validated metadata body plus the backend handle needed to
/// fetch the object's payload. The metadata is read-only; nothing in the
/// client mutates stored documents.
#[derive(Clone)]
pub struct Child {
    backend: Arc<dyn SearchBackend>,
    uuid: String,
    metadata: ObjectMetadata,
}

impl fmt::Debug for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Child")
            .field("uuid", &self.uuid)
            .field("name", &self.name())
            .finish()
    }
}

impl Child {
    /// Wrap a hit, validating its metadata body.
    pub(crate) fn from_hit(backend: Arc<dyn SearchBackend>, hit: Hit) -> Result<Self> {
        let metadata = ObjectMetadata::from_source(hit.source)?;
        Ok(Self {
            backend,
            uuid: hit.id,
            metadata,
        })
    }

    /// Stable object identifier.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// The full validated metadata body.
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// Object name.
    pub fn name(&self) -> Option<&str> {
        self.metadata.data.name.as_deref()
    }

    /// Object tagname.
    pub fn tagname(&self) -> Option<&str> {
        self.metadata.data.tagname.as_deref()
    }

    /// Storage format of the payload.
    pub fn format(&self) -> Option<&str> {
        self.metadata.data.format.as_deref()
    }

    /// Whether the object maps a stratigraphic unit.
    pub fn stratigraphic(&self) -> Option<bool> {
        self.metadata.data.stratigraphic
    }

    /// Vertical domain (depth or time).
    pub fn vertical_domain(&self) -> Option<&str> {
        self.metadata.data.vertical_domain.as_deref()
    }

    /// Iteration name.
    pub fn iteration(&self) -> Option<&str> {
        self.metadata
            .sim
            .iteration
            .as_ref()
            .and_then(|iteration| iteration.name.as_deref())
    }

    /// Realization id. Absent on aggregated objects.
    pub fn realization(&self) -> Option<i64> {
        self.metadata
            .sim
            .realization
            .as_ref()
            .and_then(|realization| realization.id)
    }

    /// Context stage.
    pub fn stage(&self) -> Option<&str> {
        self.metadata
            .sim
            .context
            .as_ref()
            .and_then(|context| context.stage.as_deref())
    }

    /// Aggregation operation. Absent on raw realizations.
    pub fn aggregation(&self) -> Option<&str> {
        self.metadata
            .sim
            .aggregation
            .as_ref()
            .and_then(|aggregation| aggregation.operation.as_deref())
    }

    /// Owning case name.
    pub fn case_name(&self) -> Option<&str> {
        self.metadata.sim.case.name.as_deref()
    }

    /// Path of the payload relative to the case root.
    pub fn relative_path(&self) -> Option<&str> {
        self.metadata
            .file
            .relative_path
            .as_deref()
    }

    /// Spatial bounding box, undecoded.
    pub fn bbox(&self) -> Option<&JsonValue> {
        self.metadata.data.bbox.as_ref()
    }

    /// Format-specific spec, undecoded.
    pub fn spec(&self) -> Option<&JsonValue> {
        self.metadata.data.spec.as_ref()
    }

    /// Timestamp of a single-timestamp object (t0 set, t1 unset).
    pub fn timestamp(&self) -> Option<&str> {
        let time = &self.metadata.data.time;
        match (&time.t0, &time.t1) {
            (Some(t0), None) => t0.value.as_deref(),
            _ => None,
        }
    }

    /// Time interval of an interval object (t0 and t1 both set).
    pub fn interval(&self) -> Option<(&str, &str)> {
        let time = &self.metadata.data.time;
        match (&time.t0, &time.t1) {
            (Some(t0), Some(t1)) => match (t0.value.as_deref(), t1.value.as_deref()) {
                (Some(t0), Some(t1)) => Some((t0, t1)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Fetch the object's binary payload.
    pub async fn blob(&self) -> Result<Bytes> {
        Ok(self.backend.fetch_blob(&self.uuid).await?)
    }

    pub(crate) fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }
}
