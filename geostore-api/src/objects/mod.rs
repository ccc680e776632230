//! Value objects wrapping validated store documents.

mod case;
mod child;
mod cube;
mod polygons;
mod surface;

pub use case::{Case, CaseCollection, CaseFilter};
pub use child::Child;
pub use cube::{Cube, CubeCollection};
pub use polygons::{Polygons, PolygonsCollection, Table};
pub use surface::{Surface, SurfaceCollection};
