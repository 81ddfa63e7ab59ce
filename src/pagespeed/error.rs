//! Error types for the pagespeed module

use thiserror::Error;

use crate::error::Error as CrateError;

/// Error type for PageSpeed measurements
#[derive(Debug, Error)]
pub enum PageSpeedError {
    /// The URL does not start with http:// or https://
    #[error("invalid URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    /// Still rate limited after the last attempt
    #[error("API rate limit exceeded after {attempts} attempts, try again later")]
    RateLimited { attempts: u32 },

    /// HTTP 400
    #[error("invalid request, check the URL format: {0}")]
    InvalidRequest(String),

    /// HTTP 403
    #[error("API key is invalid or quota exceeded")]
    Forbidden,

    /// Any other non-success status
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// Every attempt timed out
    #[error("request timed out after {attempts} attempts, the site may be too slow to analyze")]
    Timeout { attempts: u32 },

    /// Every attempt failed to connect
    #[error("connection error after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// Other transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not a PageSpeed result
    #[error("failed to decode PageSpeed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<PageSpeedError> for CrateError {
    fn from(err: PageSpeedError) -> Self {
        match err {
            PageSpeedError::InvalidUrl(_) => CrateError::InvalidRequest(err.to_string()),
            _ => CrateError::Performance(err.to_string()),
        }
    }
}
