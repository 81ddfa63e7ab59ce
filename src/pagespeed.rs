//! # PageSpeed Metrics
//!
//! Client for the PageSpeed Insights API and normalization of its Lighthouse results
//! into [`PerformanceDocument`]s.
//!
//! ## Key Components
//!
//! - `PageSpeedClient`: Issues measurements with bounded, backed-off retries
//! - `PageSpeedConfig`: Endpoint, API key, timeouts and retry policy
//! - `normalize`: Pure mapping from the raw response to the normalized document
//!
//! ## Features
//!
//! - Category scores, Core Web Vitals (timings in seconds) and field data
//! - Opportunities ranked by impact tier
//! - Strict mobile plus desktop reports

mod client;
mod config;
mod error;
mod normalize;
mod types;

pub use client::PageSpeedClient;
pub use config::{
    CATEGORIES, PAGESPEED_API_KEY_VAR, PAGESPEED_ENDPOINT, PageSpeedConfig, PageSpeedConfigBuilder,
};
pub use error::PageSpeedError;
pub use normalize::normalize;
pub use types::{
    AuditSummary, FieldMetric, Impact, LoadingExperience, Opportunity, OverallScores,
    PerformanceDocument, PerformanceMetric, PerformanceReport, RawResponse, RealUserMetric,
    ResourceSummary, Strategy, StrategyComparison, VitalMetric,
};

#[cfg(test)]
pub(crate) use normalize::tests::sample_response;
