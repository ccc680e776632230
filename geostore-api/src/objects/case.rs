//! Case documents and their collection.

use geostore_client::SearchBackend;
use geostore_search_protocol::{Hit, Pit, QueryFragment};
use std::fmt;
use std::sync::Arc;

use crate::child::PropFilter;
use crate::collection::DocumentCollection;
use crate::error::Result;
use crate::metadata::{paths, CaseMetadata, CASE_FIELDS};
use crate::objects::cube::CubeCollection;
use crate::objects::polygons::PolygonsCollection;
use crate::objects::surface::SurfaceCollection;

/// One case: the parent scope all child objects hang off.
#[derive(Clone)]
pub struct Case {
    backend: Arc<dyn SearchBackend>,
    uuid: String,
    metadata: CaseMetadata,
    pit: Option<Pit>,
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("uuid", &self.uuid)
            .field("name", &self.name())
            .finish()
    }
}

impl Case {
    pub(crate) fn from_hit(
        backend: Arc<dyn SearchBackend>,
        hit: Hit,
        pit: Option<Pit>,
    ) -> Result<Self> {
        let metadata = CaseMetadata::from_source(hit.source)?;
        Ok(Self {
            backend,
            uuid: hit.id,
            metadata,
            pit,
        })
    }

    /// Stable case identifier.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// The full validated metadata body.
    pub fn metadata(&self) -> &CaseMetadata {
        &self.metadata
    }

    /// Case name.
    pub fn name(&self) -> Option<&str> {
        self.metadata.sim.case.name.as_deref()
    }

    /// Lifecycle status.
    pub fn status(&self) -> Option<&str> {
        self.metadata.store.status.as_deref()
    }

    /// Id of the user who ran the case.
    pub fn user(&self) -> Option<&str> {
        self.metadata.sim.case.user.id.as_deref()
    }

    /// Geological field identifier.
    pub fn field(&self) -> Option<&str> {
        self.metadata
            .masterdata
            .field
            .as_ref()
            .and_then(|field| field.identifier.as_deref())
    }

    /// Owning asset name.
    pub fn asset(&self) -> Option<&str> {
        self.metadata
            .access
            .asset
            .as_ref()
            .and_then(|asset| asset.name.as_deref())
    }

    /// The surfaces of this case.
    pub fn surfaces(&self) -> SurfaceCollection {
        SurfaceCollection::new(Arc::clone(&self.backend), self.uuid.clone(), self.pit.clone())
    }

    /// The seismic cubes of this case.
    pub fn cubes(&self) -> CubeCollection {
        CubeCollection::new(Arc::clone(&self.backend), self.uuid.clone(), self.pit.clone())
    }

    /// The polygon sets of this case.
    pub fn polygons(&self) -> PolygonsCollection {
        PolygonsCollection::new(Arc::clone(&self.backend), self.uuid.clone(), self.pit.clone())
    }
}

/// Filter arguments for the case collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseFilter {
    pub name: Option<PropFilter>,
    pub status: Option<PropFilter>,
    pub user: Option<PropFilter>,
    pub field: Option<PropFilter>,
    pub uuid: Option<PropFilter>,
}

impl CaseFilter {
    /// Empty filter (matches every case).
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the case name.
    pub fn with_name(mut self, name: impl Into<PropFilter>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Constrain the lifecycle status.
    pub fn with_status(mut self, status: impl Into<PropFilter>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Constrain the running user.
    pub fn with_user(mut self, user: impl Into<PropFilter>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Constrain the geological field.
    pub fn with_field(mut self, field: impl Into<PropFilter>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Constrain the case uuid.
    pub fn with_uuid(mut self, uuid: impl Into<PropFilter>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub(crate) fn to_query(&self) -> QueryFragment {
        let props: [(&str, &Option<PropFilter>); 5] = [
            (paths::CASE_NAME, &self.name),
            (paths::CASE_STATUS, &self.status),
            (paths::CASE_USER, &self.user),
            (paths::CASE_FIELD, &self.field),
            (paths::UUID, &self.uuid),
        ];

        let mut fragment = QueryFragment::new();
        for (field, filter) in props {
            if let Some(filter) = filter {
                fragment = filter.apply(field, fragment);
            }
        }
        fragment
    }
}

/// All cases visible in the store, filterable and lazily paginated.
pub struct CaseCollection {
    docs: DocumentCollection,
}

impl CaseCollection {
    pub(crate) fn new(backend: Arc<dyn SearchBackend>, pit: Option<Pit>) -> Self {
        let select = CASE_FIELDS.iter().map(|field| field.to_string()).collect();
        Self {
            docs: DocumentCollection::new(backend, "case", Some(select), pit),
        }
    }

    /// Apply `filter`, returning a new narrowed collection.
    pub fn filter(&self, filter: CaseFilter) -> Self {
        Self {
            docs: self.docs.filtered(&filter.to_query()),
        }
    }

    /// Total number of matching cases.
    pub async fn length(&mut self) -> Result<usize> {
        self.docs.length().await
    }

    /// The case at `index`.
    pub async fn get(&mut self, index: usize) -> Result<Case> {
        let hit = self.docs.get(index).await?.clone();
        Case::from_hit(
            Arc::clone(self.docs.backend()),
            hit,
            self.docs.pit().cloned(),
        )
    }

    /// Next case in traversal order, or `None` at the end.
    pub async fn next_item(&mut self) -> Result<Option<Case>> {
        match self.docs.next_doc().await? {
            Some(hit) => Ok(Some(Case::from_hit(
                Arc::clone(self.docs.backend()),
                hit,
                self.docs.pit().cloned(),
            )?)),
            None => Ok(None),
        }
    }

    /// Restart traversal from the first case.
    pub fn rewind(&mut self) {
        self.docs.rewind();
    }

    /// The resolved query for this collection's scope.
    pub fn query(&self) -> &QueryFragment {
        self.docs.query()
    }

    /// Distinct case names.
    pub async fn names(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::CASE_NAME).await
    }

    /// Distinct lifecycle statuses.
    pub async fn statuses(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::CASE_STATUS).await
    }

    /// Distinct user ids.
    pub async fn users(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::CASE_USER).await
    }

    /// Distinct geological field identifiers.
    pub async fn fields(&mut self) -> Result<Vec<String>> {
        self.docs.field_strings(paths::CASE_FIELD).await
    }
}
