//! Error types for the site-audit crate
//!
//! Fatal failures travel as [`Error`] through [`Result`]. Steps that have a
//! meaningful fallback report through [`Outcome`] instead, so a caller can see
//! at the call site whether a value is real or a substitute.

use thiserror::Error;

/// Result type for site-audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for site-audit operations
#[derive(Debug, Error)]
pub enum Error {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error while writing artifacts or rendering to the terminal
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A page could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Crawl could not produce a site document
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// PageSpeed measurement failed
    #[error("Performance error: {0}")]
    Performance(String),

    /// AI insight extraction failed
    #[error("Insight error: {0}")]
    Insight(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result of a step that degrades instead of failing.
///
/// `Complete` carries a value that was actually produced. `Recovered` carries the
/// fallback that was substituted together with the reason the real value was lost.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The step produced its value
    Complete(T),

    /// The step failed and a fallback was substituted
    Recovered {
        /// Fallback value
        value: T,
        /// Human-readable cause of the failure
        cause: String,
    },
}

impl<T> Outcome<T> {
    /// Build a recovered outcome from any displayable cause
    pub fn recovered(value: T, cause: impl std::fmt::Display) -> Self {
        Self::Recovered {
            value,
            cause: cause.to_string(),
        }
    }

    /// Whether the value is a substitute
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// Why the value was substituted, if it was
    pub fn cause(&self) -> Option<&str> {
        match self {
            Self::Complete(_) => None,
            Self::Recovered { cause, .. } => Some(cause),
        }
    }

    /// Borrow the value regardless of how it was obtained
    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Recovered { value, .. } => value,
        }
    }

    /// Take the value regardless of how it was obtained
    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Recovered { value, .. } => value,
        }
    }
}
