//! # Geostore API
//!
//! Lazily-paginated, filterable collections over a search-indexed
//! geoscience case store. This crate composes the lower layers:
//!
//! - `geostore-search-protocol` - query model and wire envelopes
//! - `geostore-client` - the backend transport seam
//!
//! ## Model
//!
//! An [`Explorer`] hands out a [`CaseCollection`]; each [`Case`] spawns
//! collections of its child objects (surfaces, cubes, polygons). Every
//! collection pages its results from the backend on demand behind a stable
//! cursor, and `filter(...)` always returns a new independent collection
//! with a composed query, so narrowing never disturbs the collection it
//! started from.
//!
//! ## Quick start
//!
//! ```ignore
//! use geostore_api::{ChildFilter, Explorer};
//! use geostore_client::ClientConfig;
//!
//! let explorer = Explorer::connect(&ClientConfig::new("https://store.example.com/api/v1"))?;
//! let case = explorer.get_case_by_uuid(case_uuid).await?;
//!
//! // raw realizations of one horizon, narrowed step by step
//! let surfaces = case.surfaces();
//! let mut channel_fraction = surfaces
//!     .filter(ChildFilter::new().with_stage("realization"))
//!     .filter(ChildFilter::new().with_name("Valysar Fm."))
//!     .filter(ChildFilter::new().with_tagname("FACIES_Fraction_Channel"));
//!
//! for index in 0..channel_fraction.length().await? {
//!     let surface = channel_fraction.get(index).await?;
//!     println!("{:?} r{:?}", surface.name(), surface.realization());
//! }
//!
//! // server-side statistics over the same filtered set
//! let mean = channel_fraction.mean().await?;
//! ```

mod bulk;
mod child;
mod collection;
mod error;
mod explorer;
mod metadata;
mod objects;
mod time;

pub use child::{ChildCollection, ChildFilter, ChildObject, PropFilter};
pub use collection::DocumentCollection;
pub use error::{ExplorerError, Result};
pub use explorer::Explorer;
pub use metadata::{CaseMetadata, ObjectMetadata};
pub use objects::{
    Case, CaseCollection, CaseFilter, Child, Cube, CubeCollection, Polygons,
    PolygonsCollection, Surface, SurfaceCollection, Table,
};
pub use time::{TimeFilter, TimeKind};

// The wire types that show through the public API.
pub use geostore_search_protocol::{Clause, Hit, Pit, QueryFragment};
