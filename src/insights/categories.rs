//! Typed insight records, one per category, with their fixed default values
//!
//! Model output is loosely shaped: a list may arrive as a comma-separated string, a
//! text field as an array or an object. Every record therefore deserializes leniently
//! and fills blank fields from its default.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The nine insight categories, in extraction order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    BrandIdentity,
    IndustryAnalysis,
    TargetAudience,
    WebsiteGoals,
    ValuePropositions,
    VisualStyle,
    ContentStrategy,
    ConversionElements,
    TechnicalInsights,
}

impl InsightCategory {
    pub const ALL: [InsightCategory; 9] = [
        InsightCategory::BrandIdentity,
        InsightCategory::IndustryAnalysis,
        InsightCategory::TargetAudience,
        InsightCategory::WebsiteGoals,
        InsightCategory::ValuePropositions,
        InsightCategory::VisualStyle,
        InsightCategory::ContentStrategy,
        InsightCategory::ConversionElements,
        InsightCategory::TechnicalInsights,
    ];

    /// Field name of the category in an insight set
    pub fn key(&self) -> &'static str {
        match self {
            InsightCategory::BrandIdentity => "brand_identity",
            InsightCategory::IndustryAnalysis => "industry_analysis",
            InsightCategory::TargetAudience => "target_audience",
            InsightCategory::WebsiteGoals => "website_goals",
            InsightCategory::ValuePropositions => "value_propositions",
            InsightCategory::VisualStyle => "visual_style",
            InsightCategory::ContentStrategy => "content_strategy",
            InsightCategory::ConversionElements => "conversion_elements",
            InsightCategory::TechnicalInsights => "technical_insights",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().replace('_', " "))
    }
}

/// A category record that can be rebuilt from a loosely shaped JSON object
pub trait InsightRecord:
    Serialize + DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + Send + Sync
{
    const CATEGORY: InsightCategory;

    /// Build the record from parsed fields; unknown keys are ignored and blank fields
    /// take their default value
    fn from_fields(fields: Map<String, Value>) -> Self {
        serde_json::from_value::<Self>(Value::Object(fields))
            .map(backfill)
            .unwrap_or_default()
    }
}

/// Replace empty strings and empty lists with the default record's values
pub(crate) fn backfill<R>(record: R) -> R
where
    R: Serialize + DeserializeOwned + Default,
{
    let (Ok(Value::Object(mut fields)), Ok(Value::Object(defaults))) =
        (serde_json::to_value(&record), serde_json::to_value(R::default()))
    else {
        return record;
    };

    for (key, default) in defaults {
        let blank = match fields.get(&key) {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        };
        if blank {
            fields.insert(key, default);
        }
    }

    serde_json::from_value(Value::Object(fields)).unwrap_or(record)
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value_to_text(value)))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let items = match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(value_to_text).collect(),
        Value::String(text) => text.split(',').map(|item| item.trim().to_string()).collect(),
        other => vec![value_to_text(&other)],
    };
    Ok(items.into_iter().filter(|item| !item.is_empty()).collect())
}

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandIdentity {
    #[serde(deserialize_with = "lenient_list")]
    pub colors: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub tone: String,
    #[serde(deserialize_with = "lenient_text")]
    pub personality: String,
    #[serde(deserialize_with = "lenient_list")]
    pub values: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub positioning: String,
    #[serde(deserialize_with = "lenient_text")]
    pub visual_style: String,
    #[serde(deserialize_with = "lenient_text")]
    pub messaging: String,
}

impl Default for BrandIdentity {
    fn default() -> Self {
        Self {
            colors: list(&["#667eea", "#764ba2"]),
            tone: "Professional and trustworthy".to_string(),
            personality: "Reliable and professional".to_string(),
            values: list(&["Quality", "Trust", "Professionalism"]),
            positioning: "Professional service provider".to_string(),
            visual_style: "Clean and modern".to_string(),
            messaging: "Professional and solution-focused".to_string(),
        }
    }
}

impl InsightRecord for BrandIdentity {
    const CATEGORY: InsightCategory = InsightCategory::BrandIdentity;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryAnalysis {
    #[serde(deserialize_with = "lenient_text")]
    pub primary_industry: String,
    #[serde(deserialize_with = "lenient_text")]
    pub sub_industry: String,
    #[serde(deserialize_with = "lenient_text")]
    pub market_position: String,
    #[serde(deserialize_with = "lenient_text")]
    pub competitors: String,
    #[serde(deserialize_with = "lenient_text")]
    pub trends: String,
    #[serde(deserialize_with = "lenient_text")]
    pub target_market: String,
    #[serde(deserialize_with = "lenient_text")]
    pub challenges: String,
}

impl Default for IndustryAnalysis {
    fn default() -> Self {
        Self {
            primary_industry: "Professional Services".to_string(),
            sub_industry: "Consulting".to_string(),
            market_position: "Professional service provider".to_string(),
            competitors: "Other service providers in the industry".to_string(),
            trends: "Digital transformation and online presence".to_string(),
            target_market: "Businesses seeking professional services".to_string(),
            challenges: "Standing out in a competitive market".to_string(),
        }
    }
}

impl InsightRecord for IndustryAnalysis {
    const CATEGORY: InsightCategory = InsightCategory::IndustryAnalysis;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetAudience {
    #[serde(deserialize_with = "lenient_text")]
    pub primary_audience: String,
    #[serde(deserialize_with = "lenient_text")]
    pub demographics: String,
    #[serde(deserialize_with = "lenient_text")]
    pub psychographics: String,
    #[serde(deserialize_with = "lenient_list")]
    pub pain_points: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub motivations: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub decision_makers: String,
    #[serde(deserialize_with = "lenient_list")]
    pub user_personas: Vec<String>,
}

impl Default for TargetAudience {
    fn default() -> Self {
        Self {
            primary_audience: "Business owners and decision makers".to_string(),
            demographics: "Adults 25-65, business professionals".to_string(),
            psychographics: "Value quality and professionalism".to_string(),
            pain_points: list(&["Need reliable professional services"]),
            motivations: list(&["Business growth and success"]),
            decision_makers: "Business owners and managers".to_string(),
            user_personas: list(&["Business Owner Sarah", "Manager Mike"]),
        }
    }
}

impl InsightRecord for TargetAudience {
    const CATEGORY: InsightCategory = InsightCategory::TargetAudience;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebsiteGoals {
    #[serde(deserialize_with = "lenient_text")]
    pub primary_goal: String,
    #[serde(deserialize_with = "lenient_list")]
    pub secondary_goals: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub conversion_actions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub success_metrics: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub user_journey: String,
    #[serde(deserialize_with = "lenient_list")]
    pub call_to_actions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub conversion_funnel: Vec<String>,
}

impl Default for WebsiteGoals {
    fn default() -> Self {
        Self {
            primary_goal: "Lead generation".to_string(),
            secondary_goals: list(&["Brand awareness", "Information sharing"]),
            conversion_actions: list(&["Contact form submission", "Phone call"]),
            success_metrics: list(&["Lead generation rate", "Contact form submissions"]),
            user_journey: "Awareness → Interest → Consideration → Contact".to_string(),
            call_to_actions: list(&["Contact Us", "Get Quote", "Learn More"]),
            conversion_funnel: list(&["Landing page", "Service pages", "Contact page"]),
        }
    }
}

impl InsightRecord for WebsiteGoals {
    const CATEGORY: InsightCategory = InsightCategory::WebsiteGoals;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuePropositions {
    #[serde(deserialize_with = "lenient_text")]
    pub primary_vp: String,
    #[serde(deserialize_with = "lenient_list")]
    pub secondary_vps: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub usp: String,
    #[serde(deserialize_with = "lenient_list")]
    pub benefits: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub competitive_advantages: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub trust_signals: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub proof_points: Vec<String>,
}

impl Default for ValuePropositions {
    fn default() -> Self {
        Self {
            primary_vp: "Professional and reliable service".to_string(),
            secondary_vps: list(&["Quality work", "Customer satisfaction"]),
            usp: "Professional expertise and reliability".to_string(),
            benefits: list(&["Quality service", "Professional results"]),
            competitive_advantages: list(&["Experience", "Professionalism"]),
            trust_signals: list(&["Testimonials", "Certifications"]),
            proof_points: list(&["Customer testimonials", "Case studies"]),
        }
    }
}

impl InsightRecord for ValuePropositions {
    const CATEGORY: InsightCategory = InsightCategory::ValuePropositions;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualStyle {
    #[serde(deserialize_with = "lenient_list")]
    pub color_palette: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub typography: String,
    #[serde(deserialize_with = "lenient_text")]
    pub layout_style: String,
    #[serde(deserialize_with = "lenient_text")]
    pub visual_elements: String,
    #[serde(deserialize_with = "lenient_text")]
    pub design_style: String,
    #[serde(deserialize_with = "lenient_text")]
    pub brand_consistency: String,
    #[serde(deserialize_with = "lenient_text")]
    pub visual_hierarchy: String,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            color_palette: list(&["#667eea", "#764ba2", "#ffffff", "#f8f9fa"]),
            typography: "Professional sans-serif fonts".to_string(),
            layout_style: "Clean and organized".to_string(),
            visual_elements: "Professional images and icons".to_string(),
            design_style: "Modern and professional".to_string(),
            brand_consistency: "Consistent color scheme and typography".to_string(),
            visual_hierarchy: "Clear information hierarchy".to_string(),
        }
    }
}

impl InsightRecord for VisualStyle {
    const CATEGORY: InsightCategory = InsightCategory::VisualStyle;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub key_messages: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content_themes: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content_types: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub tone_of_voice: String,
    #[serde(deserialize_with = "lenient_text")]
    pub content_structure: String,
    #[serde(deserialize_with = "lenient_list")]
    pub call_to_actions: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub content_gaps: Vec<String>,
}

impl Default for ContentStrategy {
    fn default() -> Self {
        Self {
            key_messages: list(&["Professional service", "Quality results"]),
            content_themes: list(&["Professional expertise", "Quality service"]),
            content_types: list(&["Service pages", "About page", "Contact information"]),
            tone_of_voice: "Professional and helpful".to_string(),
            content_structure: "Clear sections with headings".to_string(),
            call_to_actions: list(&["Contact Us", "Learn More"]),
            content_gaps: list(&["More detailed service information", "Case studies"]),
        }
    }
}

impl InsightRecord for ContentStrategy {
    const CATEGORY: InsightCategory = InsightCategory::ContentStrategy;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionElements {
    #[serde(deserialize_with = "lenient_list")]
    pub primary_ctas: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub secondary_ctas: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub trust_elements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub social_proof: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub urgency_elements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub lead_magnets: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub conversion_funnel: Vec<String>,
}

impl Default for ConversionElements {
    fn default() -> Self {
        Self {
            primary_ctas: list(&["Contact Us", "Get Quote"]),
            secondary_ctas: list(&["Learn More", "Download Brochure"]),
            trust_elements: list(&["Testimonials", "Certifications"]),
            social_proof: list(&["Customer reviews", "Success stories"]),
            urgency_elements: list(&["Limited availability", "Special offers"]),
            lead_magnets: list(&["Free consultation", "Service guide"]),
            conversion_funnel: list(&["Landing page", "Service pages", "Contact form"]),
        }
    }
}

impl InsightRecord for ConversionElements {
    const CATEGORY: InsightCategory = InsightCategory::ConversionElements;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalInsights {
    #[serde(deserialize_with = "lenient_list")]
    pub essential_features: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub integration_needs: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub performance_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub seo_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub accessibility: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub mobile_requirements: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub security_needs: Vec<String>,
}

impl Default for TechnicalInsights {
    fn default() -> Self {
        Self {
            essential_features: list(&["Contact forms", "Service pages", "About page"]),
            integration_needs: list(&["Email marketing", "Analytics"]),
            performance_requirements: list(&["Fast loading", "Mobile responsive"]),
            seo_requirements: list(&["Meta tags", "Structured data"]),
            accessibility: list(&["Alt text", "Keyboard navigation"]),
            mobile_requirements: list(&["Responsive design", "Touch-friendly"]),
            security_needs: list(&["HTTPS", "Form security"]),
        }
    }
}

impl InsightRecord for TechnicalInsights {
    const CATEGORY: InsightCategory = InsightCategory::TechnicalInsights;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_category_keys() {
        let keys: Vec<&str> = InsightCategory::ALL.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], "brand_identity");
        assert_eq!(keys[8], "technical_insights");
        assert_eq!(InsightCategory::WebsiteGoals.to_string(), "website goals");
        assert_eq!(
            serde_json::to_string(&InsightCategory::ValuePropositions).unwrap(),
            "\"value_propositions\""
        );
    }

    #[test]
    fn test_from_fields_coerces_shapes() {
        let record = TargetAudience::from_fields(fields(json!({
            "primary_audience": ["Founders", "CTOs"],
            "demographics": {"age": "30-50", "income": "high"},
            "pain_points": "Slow hiring, unclear pricing",
            "motivations": ["Growth", ""],
            "user_personas": [{"name": "Ana"}],
            "unknown_key": 42
        })));

        assert_eq!(record.primary_audience, "Founders, CTOs");
        assert_eq!(record.demographics, "age: 30-50; income: high");
        assert_eq!(record.pain_points, vec!["Slow hiring", "unclear pricing"]);
        assert_eq!(record.motivations, vec!["Growth"]);
        assert_eq!(record.user_personas, vec!["name: Ana"]);
        assert_eq!(record.psychographics, TargetAudience::default().psychographics);
    }

    #[test]
    fn test_from_fields_backfills_blank_values() {
        let record = BrandIdentity::from_fields(fields(json!({
            "tone": "Playful",
            "colors": [],
            "messaging": "   "
        })));

        let defaults = BrandIdentity::default();
        assert_eq!(record.tone, "Playful");
        assert_eq!(record.colors, defaults.colors);
        assert_eq!(record.messaging, defaults.messaging);
        assert_eq!(record.values, defaults.values);
    }

    #[test]
    fn test_from_fields_without_known_keys_is_default() {
        let record = TechnicalInsights::from_fields(fields(json!({"foo": "bar", "baz": 1})));
        assert_eq!(record, TechnicalInsights::default());
    }
}
