//! HTTP fetcher implementation
//!
//! This module retrieves target pages for the analyzer:
//! - Building the HTTP client with the fixed header set
//! - Bounded-time GET requests
//! - Error classification (timeout, connection, scheme)
//!
//! Non-2xx responses are not failures: their body is analyzed like any
//! other page.

use crate::config::FetcherConfig;
use crate::{ConfigError, FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Retrieves the HTML of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns the response body
    ///
    /// # Errors
    /// - `FetchError::Timeout` if the request did not complete in time
    /// - `FetchError::Connect` on DNS, refused or reset connections
    /// - `FetchError::UnsupportedScheme` for anything but http/https
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// Builds an HTTP client with the configured headers and timeout
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ConfigError)` - A header value is invalid or the client failed to build
///
/// # Example
///
/// ```no_run
/// use gtm_probe::config::FetcherConfig;
/// use gtm_probe::pipeline::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept_language", &config.accept_language)?,
    );

    Client::builder()
        .user_agent(header_value("user_agent", &config.user_agent)?)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| ConfigError::Validation(format!("Failed to build HTTP client: {}", e)))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|_| ConfigError::Validation(format!("Invalid {} header value: {:?}", name, value)))
}

/// `PageFetcher` backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(config: &FetcherConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::UnsupportedScheme {
                scheme: parsed.scheme().to_string(),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                url,
                status = status.as_u16(),
                "Non-success status, analyzing body anyway"
            );
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Maps a request error onto the fetch error kinds
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: error,
        }
    }
}
