//! Seismic cube objects.

use geostore_client::{ClientError, SearchBackend};
use geostore_search_protocol::Hit;
use std::ops::Deref;
use std::sync::Arc;

use crate::child::{ChildCollection, ChildObject};
use crate::error::Result;
use crate::objects::child::Child;

/// A seismic cube stored in a case.
///
/// Cube payloads are large, so they are not fetched through the blob
/// endpoint; instead the store hands out a temporary signed URL which
/// volume readers stream from directly. The URL is resolved lazily on first
/// use and cached on the handle for its remaining lifetime (the signature
/// expires server-side; a new handle gets a new signature).
#[derive(Debug, Clone)]
pub struct Cube {
    child: Child,
    auth_uri: Option<String>,
}

impl ChildObject for Cube {
    const DOC_TYPE: &'static str = "cube";

    fn from_hit(backend: Arc<dyn SearchBackend>, hit: Hit) -> Result<Self> {
        Ok(Self {
            child: Child::from_hit(backend, hit)?,
            auth_uri: None,
        })
    }
}

impl Deref for Cube {
    type Target = Child;

    fn deref(&self) -> &Child {
        &self.child
    }
}

impl Cube {
    async fn ensure_auth_uri(&mut self) -> Result<(usize, &str)> {
        if self.auth_uri.is_none() {
            let uri = self
                .child
                .backend()
                .blob_auth_uri(self.child.uuid())
                .await?;
            self.auth_uri = Some(uri);
        }

        let uri = self.auth_uri.as_deref().unwrap_or_default();
        let split = uri.find('?').ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "signed URL carries no query delimiter: {uri}"
            ))
        })?;
        Ok((split, uri))
    }

    /// Base URL of the cube volume, with a trailing slash.
    pub async fn url(&mut self) -> Result<String> {
        let (split, uri) = self.ensure_auth_uri().await?;
        Ok(format!("{}/", &uri[..split]))
    }

    /// Signed access token for the cube volume (the URL's query part).
    pub async fn sas(&mut self) -> Result<String> {
        let (split, uri) = self.ensure_auth_uri().await?;
        Ok(uri[split + 1..].to_string())
    }
}

/// The seismic cubes of one case.
pub type CubeCollection = ChildCollection<Cube>;
