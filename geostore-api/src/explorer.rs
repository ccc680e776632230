//! Top-level entry point.

use geostore_client::{ClientConfig, HttpSearchBackend, SearchBackend};
use geostore_search_protocol::Pit;
use std::sync::Arc;

use crate::error::Result;
use crate::objects::{Case, CaseCollection, CaseFilter};

/// Entry point into a case store.
///
/// Owns the backend handle and the optional point-in-time token that every
/// collection spawned from here inherits.
///
/// # Example
///
/// ```ignore
/// use geostore_api::{CaseFilter, ChildFilter, Explorer};
/// use geostore_client::ClientConfig;
///
/// let explorer = Explorer::connect(
///     &ClientConfig::new("https://store.example.com/api/v1").with_auth_token(token),
/// )?;
///
/// let case = explorer.get_case_by_uuid("2c2f47cf-c7ab-4112-87f9-b4797ec51cb6").await?;
/// let mut surfaces = case
///     .surfaces()
///     .filter(ChildFilter::new().with_iteration("iter-0").with_aggregation(false));
///
/// println!("{} surfaces", surfaces.length().await?);
/// ```
pub struct Explorer {
    backend: Arc<dyn SearchBackend>,
    pit: Option<Pit>,
}

impl Explorer {
    /// Explorer over an already-constructed backend.
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend, pit: None }
    }

    /// Explorer over an HTTP backend built from `config`.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let backend = HttpSearchBackend::from_config(config)?;
        Ok(Self::new(Arc::new(backend)))
    }

    /// Pin this explorer (and everything spawned from it) to a consistent
    /// backend snapshot with the given keep-alive lifetime.
    pub async fn with_snapshot(mut self, keep_alive: &str) -> Result<Self> {
        let pit = self.backend.open_pit(keep_alive).await?;
        self.pit = Some(pit);
        Ok(self)
    }

    /// All cases visible in the store.
    pub fn cases(&self) -> CaseCollection {
        CaseCollection::new(Arc::clone(&self.backend), self.pit.clone())
    }

    /// Look one case up by uuid.
    ///
    /// An unknown uuid surfaces as `OutOfRange` from the underlying
    /// one-element collection.
    pub async fn get_case_by_uuid(&self, uuid: &str) -> Result<Case> {
        let mut cases = self.cases().filter(CaseFilter::new().with_uuid(uuid));
        cases.get(0).await
    }
}
