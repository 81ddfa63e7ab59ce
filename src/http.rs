//! HTTP page fetcher for the site-audit crate
//!
//! This module provides the [`Fetcher`] used by the crawler and the style sniffer to
//! download documents. It presents a browser-like identity, keeps a per-run cookie
//! store and applies a connect/read timeout pair. It never retries; the caller decides
//! whether a failed fetch is skipped or aborts the run.

use crate::error::Error as CrateError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS};
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// User agent presented to audited sites
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default connect timeout in seconds
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error returned when a document cannot be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is not an absolute http(s) URL
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// URL that was requested
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("{url} returned HTTP {status}")]
    Status {
        /// URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Transport-level failure (DNS, connect, timeout, body read)
    #[error("request to {url} failed: {source}")]
    Request {
        /// URL that was requested
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// URL the failed fetch was for, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { url, .. } | Self::Status { url, .. } | Self::Request { url, .. } => {
                Some(url)
            }
            Self::Client(_) => None,
        }
    }
}

impl From<FetchError> for CrateError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUrl { .. } => CrateError::InvalidRequest(err.to_string()),
            _ => CrateError::Fetch(err.to_string()),
        }
    }
}

/// Browser-like HTTP fetcher
///
/// Cloning is cheap and shares the connection pool and cookie store.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: ReqwestClient,
}

impl Fetcher {
    /// Create a fetcher with the default browser identity and timeouts
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(BROWSER_USER_AGENT, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom user agent and request timeout
    pub fn with_options(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = ReqwestClient::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }

    /// Fetch a document and return its body as text
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http(s) URL of the document
    ///
    /// # Returns
    ///
    /// The response body, or a [`FetchError`] naming the URL and cause
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
