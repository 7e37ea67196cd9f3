//! HTTP client for the remote statistics API
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: Core HTTP operations with rate limiting and retries
//! - `source`: The `RemoteSource` seam plus in-memory implementations

use async_trait::async_trait;
use url::Url;

use crate::errors::{ApiError, ApiResult};

pub mod config;
pub mod http;
pub mod source;

pub use config::ClientConfig;
pub use source::{OfflineSource, RemoteSource, StaticSource};

use http::HttpHandler;

/// HTTP client for an Ergast-compatible statistics API
#[derive(Debug)]
pub struct ErgastClient {
    http_handler: HttpHandler,
    base_url: String,
}

impl ErgastClient {
    /// Creates a client with the default configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the HTTP client cannot be built
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the base URL is invalid or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.clone(),
            error: e.to_string(),
        })?;

        let client = config.build_http_client()?;
        let http_handler = HttpHandler::new(
            client,
            config.rate_limit_rps,
            config.max_retries,
            config.retry_base_delay,
        )?;

        tracing::info!("Created statistics API client for {}", base_url);

        Ok(Self {
            http_handler,
            base_url,
        })
    }

    /// Full URL for an endpoint relative to the API root
    pub fn endpoint_url(&self, endpoint: &str) -> ApiResult<Url> {
        let raw = format!("{}{}", self.base_url, endpoint);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw,
            error: e.to_string(),
        })
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteSource for ErgastClient {
    async fn fetch(&self, endpoint: &str) -> ApiResult<String> {
        let url = self.endpoint_url(endpoint)?;
        self.http_handler.get_text(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::api;

    #[test]
    fn test_client_creation() {
        let client = ErgastClient::new().unwrap();
        assert_eq!(client.base_url(), api::BASE_URL);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            ErgastClient::with_config(ClientConfig::with_base_url("https://api.jolpi.ca/ergast/f1/"))
                .unwrap();
        let url = client.endpoint_url("/2024/driverStandings.json").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.jolpi.ca/ergast/f1/2024/driverStandings.json"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = ErgastClient::with_config(ClientConfig::with_base_url("not a url"));
        assert!(matches!(result, Err(ApiError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_surfaces_transport_error() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:1/api/f1").with_max_retries(0);
        let client = ErgastClient::with_config(config).unwrap();

        let result = client.fetch("/seasons.json?limit=20").await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
