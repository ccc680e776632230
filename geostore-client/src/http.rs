//! HTTP implementation of [`SearchBackend`].

use async_trait::async_trait;
use bytes::Bytes;
use geostore_search_protocol::{AggregateRequest, Pit, SearchRequest, SearchResponse};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::backend::SearchBackend;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Backend implementation over HTTP.
///
/// Serializes protocol envelopes as JSON request bodies, passes the
/// configured bearer token through on every call, and maps transport and
/// status failures onto [`ClientError`] without retrying.
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl fmt::Debug for HttpSearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSearchBackend")
            .field("base_url", &self.base_url)
            .field("has_auth_token", &self.auth_token.is_some())
            .finish()
    }
}

impl HttpSearchBackend {
    /// Build a backend from configuration.
    ///
    /// Fails when the endpoint is missing or the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_ref()
            .ok_or_else(|| ClientError::Config("missing 'endpoint'".to_string()))?;

        let connect_timeout =
            Duration::from_millis(config.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS));
        let request_timeout =
            Duration::from_millis(config.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    /// Backend at `base_url` with default timeouts and no auth token.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        }
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.auth_token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    /// Map a non-2xx response to a [`ClientError`], reading the body for
    /// error text.
    async fn map_error(resp: reqwest::Response) -> ClientError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        status_error(status, body)
    }

    /// Map a reqwest error (network/timeout) to a [`ClientError`].
    fn map_network_error(e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ClientError::Network(format!("connection failed: {e}"))
        } else {
            ClientError::Network(e.to_string())
        }
    }

    async fn checked(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(Self::map_error(resp).await)
        }
    }
}

fn status_error(status: StatusCode, body: String) -> ClientError {
    let body = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    } else {
        body
    };
    ClientError::Status {
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, size = request.size, "search request");

        let resp = self
            .add_auth(self.client.post(&url).json(request))
            .send()
            .await
            .map_err(Self::map_network_error)?;
        let resp = Self::checked(resp).await?;

        resp.json::<SearchResponse>()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("search response: {e}")))
    }

    async fn aggregate(&self, request: &AggregateRequest) -> Result<Bytes> {
        let url = format!("{}/aggregate", self.base_url);
        debug!(url = %url, ids = request.object_ids.len(), "aggregate request");

        let resp = self
            .add_auth(self.client.post(&url).json(request))
            .send()
            .await
            .map_err(Self::map_network_error)?;
        let resp = Self::checked(resp).await?;

        resp.bytes()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("aggregate payload: {e}")))
    }

    async fn fetch_blob(&self, object_id: &str) -> Result<Bytes> {
        let url = format!("{}/objects('{}')/blob", self.base_url, object_id);
        debug!(url = %url, "blob request");

        let resp = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_network_error)?;
        let resp = Self::checked(resp).await?;

        resp.bytes()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("blob payload: {e}")))
    }

    async fn blob_auth_uri(&self, object_id: &str) -> Result<String> {
        let url = format!("{}/objects('{}')/blob/authuri", self.base_url, object_id);
        debug!(url = %url, "blob auth uri request");

        let resp = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_network_error)?;
        let resp = Self::checked(resp).await?;

        resp.text()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("auth uri: {e}")))
    }

    async fn open_pit(&self, keep_alive: &str) -> Result<Pit> {
        let url = format!("{}/pit", self.base_url);
        debug!(url = %url, keep_alive = %keep_alive, "open pit");

        let resp = self
            .add_auth(self.client.post(&url).query(&[("keep-alive", keep_alive)]))
            .send()
            .await
            .map_err(Self::map_network_error)?;
        let resp = Self::checked(resp).await?;

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("pit response: {e}")))?;
        let id = body
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| ClientError::InvalidResponse("pit response missing 'id'".to_string()))?;

        Ok(Pit::new(id, keep_alive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_missing_endpoint() {
        let result = HttpSearchBackend::from_config(&ClientConfig::default());
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_from_config_with_endpoint() {
        let config = ClientConfig::new("https://store.example.com/api/v1/");
        let backend = HttpSearchBackend::from_config(&config).unwrap();
        assert_eq!(backend.base_url, "https://store.example.com/api/v1");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let backend = HttpSearchBackend::new("https://store.example.com/");
        assert_eq!(backend.base_url, "https://store.example.com");
    }

    #[test]
    fn test_debug_hides_token() {
        let backend = HttpSearchBackend::new("https://store.example.com")
            .with_auth_token("secret-token");

        let debug_output = format!("{backend:?}");
        assert!(debug_output.contains("has_auth_token: true"));
        assert!(!debug_output.contains("secret-token"));
    }

    #[test]
    fn test_status_error_uses_body() {
        let err = status_error(StatusCode::BAD_REQUEST, "bad query".to_string());
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "bad query");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_empty_body_falls_back_to_reason() {
        let err = status_error(StatusCode::NOT_FOUND, String::new());
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
