//! Client configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a backend connection.
///
/// # Example
///
/// ```rust
/// use geostore_client::ClientConfig;
///
/// let config = ClientConfig::new("https://store.example.com/api/v1")
///     .with_auth_token("my-token")
///     .with_request_timeout_ms(10_000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (e.g. "https://store.example.com/api/v1").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bearer token passed through on every request (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Connection timeout in milliseconds (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    /// Per-request timeout in milliseconds (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Configuration pointing at `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Set the bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = Some(timeout_ms);
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("https://store.example.com/api/v1")
            .with_auth_token("secret")
            .with_connect_timeout_ms(2_000)
            .with_request_timeout_ms(10_000);

        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://store.example.com/api/v1")
        );
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout_ms, Some(2_000));
        assert_eq!(config.request_timeout_ms, Some(10_000));
    }

    #[test]
    fn test_serde_round_trip_omits_unset_fields() {
        let config = ClientConfig::new("https://store.example.com");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("auth_token"));

        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.endpoint, config.endpoint);
    }
}
