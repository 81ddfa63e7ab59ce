//! # AI Insight Extraction
//!
//! Asks a completion model for brand, audience and conversion insights about a crawled
//! site, one category at a time, and turns its free-form answers into typed records.
//!
//! ## Key Components
//!
//! - `InsightExtractor`: Drives one prompt per category through a `rig` agent
//! - `AIInsightSet`: The nine category records, always fully populated
//! - `parse_response`: Best-effort recovery of fields from model output
//!
//! ## Features
//!
//! - Per-category fallback to a fixed default record on any failure
//! - Lenient field coercion (lists from comma strings, text from arrays or objects)
//! - Works with any `CompletionModel`, rate-limited Gemini in production

use rig::agent::{Agent, AgentBuilder};
use rig::completion::{CompletionModel, Prompt};
use rig::providers::gemini;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::crawler::SiteDocument;
use crate::error::Outcome;
use crate::model::{Client, GEMINI_API_KEY_VAR, GeminiCompletionModel};

mod analysis;
mod categories;
mod config;
mod error;
mod prompts;
mod repair;

pub use analysis::{ContentAnalysis, PageTypeSummary, content_analysis, recommendations};
pub use categories::{
    BrandIdentity, ContentStrategy, ConversionElements, IndustryAnalysis, InsightCategory,
    InsightRecord, TargetAudience, TechnicalInsights, ValuePropositions, VisualStyle,
    WebsiteGoals,
};
pub use config::{DEFAULT_PREAMBLE, InsightConfig, InsightConfigBuilder};
pub use error::InsightError;
pub use prompts::{build_digest, category_prompt};
pub use repair::parse_response;

/// Insights for all nine categories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AIInsightSet {
    pub brand_identity: BrandIdentity,
    pub industry_analysis: IndustryAnalysis,
    pub target_audience: TargetAudience,
    pub website_goals: WebsiteGoals,
    pub value_propositions: ValuePropositions,
    pub visual_style: VisualStyle,
    pub content_strategy: ContentStrategy,
    pub conversion_elements: ConversionElements,
    pub technical_insights: TechnicalInsights,
}

/// Turn a raw model answer into a category record
pub fn record_from_response<R: InsightRecord>(response: &str) -> Result<R, InsightError> {
    if response.trim().is_empty() {
        return Err(InsightError::EmptyResponse);
    }
    parse_response(response)
        .map(R::from_fields)
        .ok_or(InsightError::Unparsable)
}

fn settle<T>(outcome: Outcome<T>, recovered: &mut usize) -> T {
    if outcome.is_recovered() {
        *recovered += 1;
    }
    outcome.into_value()
}

/// Extracts AI insights with a completion model
pub struct InsightExtractor<M: CompletionModel> {
    agent: Agent<M>,
    config: InsightConfig,
}

impl<M: CompletionModel> InsightExtractor<M> {
    pub fn new(model: M, config: InsightConfig) -> Self {
        let agent = AgentBuilder::new(model).preamble(&config.preamble).build();
        Self { agent, config }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Build the content digest for `site` within the configured limits
    pub fn digest(&self, site: &SiteDocument) -> String {
        build_digest(
            site,
            self.config.page_content_chars,
            self.config.max_digest_chars,
        )
    }

    async fn ask(&self, prompt: &str) -> Result<String, InsightError> {
        let response = self.agent.prompt(prompt).await?;
        debug!("Model answered with {} bytes", response.len());
        Ok(response)
    }

    async fn try_extract<R: InsightRecord>(&self, digest: &str) -> Result<R, InsightError> {
        let prompt = category_prompt(R::CATEGORY, digest);
        let response = self.ask(&prompt).await?;
        record_from_response(&response)
    }

    /// Extract one category, falling back to its default record
    #[instrument(skip(self, digest), fields(category = %R::CATEGORY))]
    pub async fn extract_category<R: InsightRecord>(&self, digest: &str) -> Outcome<R> {
        match self.try_extract::<R>(digest).await {
            Ok(record) => Outcome::Complete(record),
            Err(e) => {
                warn!("{} analysis failed, using defaults: {}", R::CATEGORY, e);
                Outcome::recovered(R::default(), e)
            }
        }
    }

    /// Extract every category in order; never fails
    #[instrument(skip(self, site), fields(url = %site.base_url))]
    pub async fn extract_all(&self, site: &SiteDocument) -> AIInsightSet {
        let digest = self.digest(site);
        let mut recovered = 0usize;

        let brand_identity = settle(
            self.extract_category::<BrandIdentity>(&digest).await,
            &mut recovered,
        );
        let industry_analysis = settle(
            self.extract_category::<IndustryAnalysis>(&digest).await,
            &mut recovered,
        );
        let target_audience = settle(
            self.extract_category::<TargetAudience>(&digest).await,
            &mut recovered,
        );
        let website_goals = settle(
            self.extract_category::<WebsiteGoals>(&digest).await,
            &mut recovered,
        );
        let value_propositions = settle(
            self.extract_category::<ValuePropositions>(&digest).await,
            &mut recovered,
        );
        let visual_style = settle(
            self.extract_category::<VisualStyle>(&digest).await,
            &mut recovered,
        );
        let content_strategy = settle(
            self.extract_category::<ContentStrategy>(&digest).await,
            &mut recovered,
        );
        let conversion_elements = settle(
            self.extract_category::<ConversionElements>(&digest).await,
            &mut recovered,
        );
        let technical_insights = settle(
            self.extract_category::<TechnicalInsights>(&digest).await,
            &mut recovered,
        );

        info!(
            "AI analysis finished: {} of {} categories used defaults",
            recovered,
            InsightCategory::ALL.len()
        );

        AIInsightSet {
            brand_identity,
            industry_analysis,
            target_audience,
            website_goals,
            value_propositions,
            visual_style,
            content_strategy,
            conversion_elements,
            technical_insights,
        }
    }
}

/// Build an extractor backed by Gemini
///
/// A missing or blank `api_key` leaves no backend to talk to.
pub fn gemini_extractor(
    api_key: Option<&str>,
    free_tier: bool,
    config: InsightConfig,
) -> Result<InsightExtractor<GeminiCompletionModel>, InsightError> {
    let api_key = api_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            InsightError::BackendUnavailable(format!("{} is not set", GEMINI_API_KEY_VAR))
        })?;

    let gemini_client = gemini::Client::new(api_key);
    let client = if free_tier {
        Client::new_gemini_free(gemini_client)
    } else {
        Client::new_gemini(gemini_client)
    };
    Ok(InsightExtractor::new(client.into_completion(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{PageRecord, PageType};
    use crate::model::mock_model::MockCompletionModel;

    fn site() -> SiteDocument {
        SiteDocument {
            base_url: "https://acme.test".to_string(),
            pages: vec![PageRecord {
                url: "https://acme.test/".to_string(),
                title: "Acme".to_string(),
                body_text: "We build widgets.".to_string(),
                page_type: PageType::Home,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_backend_failure_yields_default_record() {
        let mock = MockCompletionModel::new();
        mock.set_error("backend down").await;
        let extractor = InsightExtractor::new(mock, InsightConfig::default());

        let outcome = extractor.extract_category::<BrandIdentity>("digest").await;
        assert!(outcome.is_recovered());
        let record = outcome.into_value();
        assert_eq!(record, BrandIdentity::default());
        assert_eq!(record.colors, vec!["#667eea", "#764ba2"]);
        assert_eq!(record.tone, "Professional and trustworthy");
    }

    #[tokio::test]
    async fn test_empty_response_yields_default_record() {
        let extractor = InsightExtractor::new(MockCompletionModel::new(), InsightConfig::default());
        match extractor.extract_category::<BrandIdentity>("digest").await {
            Outcome::Recovered { value, cause } => {
                assert_eq!(value, BrandIdentity::default());
                assert!(cause.contains("empty"));
            }
            Outcome::Complete(_) => panic!("expected fallback"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_repaired() {
        let mock = MockCompletionModel::new();
        mock.set_text_response(r#"{"tone": "bold", "colors": [blue, green],}"#)
            .await;
        let extractor = InsightExtractor::new(mock, InsightConfig::default());

        let outcome = extractor.extract_category::<BrandIdentity>("digest").await;
        assert!(!outcome.is_recovered());
        let record = outcome.into_value();
        assert_eq!(record.colors, vec!["blue", "green"]);
        assert_eq!(record.tone, "bold");
        assert_eq!(record.personality, BrandIdentity::default().personality);
    }

    #[tokio::test]
    async fn test_extract_all_is_total() {
        let mock = MockCompletionModel::new();
        mock.set_text_response(
            "```json\n{\"primary_goal\": \"Online sales\", \"tone\": \"Playful\"}\n```",
        )
        .await;
        let extractor = InsightExtractor::new(mock.clone(), InsightConfig::default());

        let insights = extractor.extract_all(&site()).await;
        assert_eq!(mock.calls(), 9);
        assert_eq!(insights.website_goals.primary_goal, "Online sales");
        assert_eq!(insights.brand_identity.tone, "Playful");
        assert_eq!(insights.industry_analysis, IndustryAnalysis::default());
        assert_eq!(
            insights.website_goals.secondary_goals,
            WebsiteGoals::default().secondary_goals
        );

        let value = serde_json::to_value(&insights).unwrap();
        let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        let mut expected: Vec<&str> = InsightCategory::ALL.iter().map(|c| c.key()).collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_extract_all_with_failing_backend() {
        let mock = MockCompletionModel::new();
        mock.set_error("unavailable").await;
        let extractor = InsightExtractor::new(mock, InsightConfig::default());
        assert_eq!(extractor.extract_all(&site()).await, AIInsightSet::default());
    }

    #[test]
    fn test_record_from_response_line_scan() {
        let record: WebsiteGoals = record_from_response(
            "Primary Goal: Bookings\nCall To Actions: Book now, Call us\n",
        )
        .unwrap();
        assert_eq!(record.primary_goal, "Bookings");
        assert_eq!(record.call_to_actions, vec!["Book now", "Call us"]);

        assert!(matches!(
            record_from_response::<WebsiteGoals>("nope"),
            Err(InsightError::Unparsable)
        ));
    }

    #[test]
    fn test_gemini_extractor_requires_api_key() {
        for key in [None, Some(""), Some("   ")] {
            let err = match gemini_extractor(key, false, InsightConfig::default()) {
                Ok(_) => panic!("expected a missing backend for {:?}", key),
                Err(err) => err,
            };
            assert!(matches!(err, InsightError::BackendUnavailable(_)));
            assert!(err.to_string().contains(GEMINI_API_KEY_VAR));
        }
    }
}
