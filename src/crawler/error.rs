//! Error types for the crawler module

use crate::error::Error as CrateError;
use crate::http::FetchError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The root page could not be fetched; the crawl cannot continue
    #[error("could not access main page {url}: {cause}")]
    MainPageUnavailable {
        /// Normalized base URL
        url: String,
        /// Fetch or parse failure behind it
        cause: String,
    },

    /// A page could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// HTML parsing error
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The base URL cannot be crawled
    #[error("Invalid base URL {0}")]
    InvalidBaseUrl(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Fetch(e) => e.into(),
            CrawlError::InvalidBaseUrl(_) | CrawlError::UrlParse(_) => {
                CrateError::InvalidRequest(err.to_string())
            }
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
