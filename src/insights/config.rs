//! # Insight Extraction Configuration
//!
//! Bounds on the content digest sent to the model and the preamble the agent is built
//! with.

/// Instructions every insight agent starts from
pub const DEFAULT_PREAMBLE: &str = "You are a senior brand strategist and conversion-focused web \
consultant. You analyze website content and answer strictly in the JSON structure you are given.";

/// Configuration for AI insight extraction
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Maximum characters of the whole content digest
    pub max_digest_chars: usize,

    /// Maximum characters of body text quoted per page
    pub page_content_chars: usize,

    /// System preamble of the agent
    pub preamble: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            max_digest_chars: 12_000,
            page_content_chars: 2_000,
            preamble: DEFAULT_PREAMBLE.to_string(),
        }
    }
}

/// Builder for InsightConfig
#[derive(Debug, Default)]
pub struct InsightConfigBuilder {
    config: InsightConfig,
}

impl InsightConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the digest length cap in characters
    pub fn max_digest_chars(mut self, chars: usize) -> Self {
        self.config.max_digest_chars = chars;
        self
    }

    /// Set how much body text is quoted per page
    pub fn page_content_chars(mut self, chars: usize) -> Self {
        self.config.page_content_chars = chars;
        self
    }

    pub fn preamble(mut self, preamble: impl Into<String>) -> Self {
        self.config.preamble = preamble.into();
        self
    }

    pub fn build(self) -> InsightConfig {
        self.config
    }
}

impl InsightConfig {
    pub fn builder() -> InsightConfigBuilder {
        InsightConfigBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = InsightConfig::builder()
            .max_digest_chars(500)
            .page_content_chars(100)
            .preamble("Be brief.")
            .build();
        assert_eq!(config.max_digest_chars, 500);
        assert_eq!(config.page_content_chars, 100);
        assert_eq!(config.preamble, "Be brief.");
        assert_eq!(InsightConfig::default().max_digest_chars, 12_000);
    }
}
