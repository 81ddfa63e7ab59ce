//! # Crawler Configuration Module
//!
//! This module provides configuration options for the site crawler: how many pages a
//! crawl may visit, how long to pause between requests and which identity the fetcher
//! presents. It uses a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration
//!
//! ## Features
//!
//! - Defaults suitable for a polite audit (10 pages, one second apart)
//! - A page budget that always leaves room for the root page
//! - User-agent and timeout customization

use std::time::Duration;

use crate::http::{BROWSER_USER_AGENT, DEFAULT_TIMEOUT_SECS};

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of pages to analyze, root page included
    pub max_pages: usize,

    /// Delay in milliseconds between requests
    pub delay_ms: u64,

    /// User agent to use for requests
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            delay_ms: 1000,
            user_agent: BROWSER_USER_AGENT.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to analyze (at least 1)
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages.max(1);
        self
    }

    /// Set the delay in milliseconds between requests
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.delay_ms = delay_ms;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout in seconds
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the inter-request delay as a Duration
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Number of pages that may be fetched after the root page
    pub fn additional_page_budget(&self) -> usize {
        self.max_pages.max(1) - 1
    }
}
