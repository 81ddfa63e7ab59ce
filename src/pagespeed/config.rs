//! # PageSpeed Client Configuration
//!
//! Endpoint, credentials, timeouts and retry policy of the [`PageSpeedClient`].
//!
//! [`PageSpeedClient`]: crate::pagespeed::PageSpeedClient

use std::time::Duration;

/// Public PageSpeed Insights v5 endpoint
pub const PAGESPEED_ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// Environment variable holding the optional API key
pub const PAGESPEED_API_KEY_VAR: &str = "PAGESPEED_API_KEY";

/// Lighthouse categories requested on every run
pub const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

/// Configuration for the PageSpeed client
#[derive(Debug, Clone)]
pub struct PageSpeedConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key; requests without one share the public quota
    pub api_key: Option<String>,

    /// Attempts per measurement, first try included
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on every further retry
    pub backoff_base_ms: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for PageSpeedConfig {
    fn default() -> Self {
        Self {
            endpoint: PAGESPEED_ENDPOINT.to_string(),
            api_key: None,
            max_attempts: 3,
            backoff_base_ms: 2000,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

/// Builder for PageSpeedConfig
#[derive(Debug, Default)]
pub struct PageSpeedConfigBuilder {
    config: PageSpeedConfig,
}

impl PageSpeedConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the API key; blank keys are ignored
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.config.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    /// Read the API key from `PAGESPEED_API_KEY`
    pub fn api_key_from_env(self) -> Self {
        self.api_key(std::env::var(PAGESPEED_API_KEY_VAR).ok())
    }

    /// Set the number of attempts (at least 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts.max(1);
        self
    }

    pub fn backoff_base_ms(mut self, ms: u64) -> Self {
        self.config.backoff_base_ms = ms;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn build(self) -> PageSpeedConfig {
        self.config
    }
}

impl PageSpeedConfig {
    pub fn builder() -> PageSpeedConfigBuilder {
        PageSpeedConfigBuilder::new()
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
