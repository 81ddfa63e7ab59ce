//! # Page Builder Prompt
//!
//! Renders the audit results into a markdown prompt for an AI page builder.
//!
//! ## Key Components
//!
//! - `synthesize`: Deterministic template filling from the site, performance and insight data
//! - `export_prompt`: Plain text or JSON export of a rendered prompt
//!
//! Every interpolated field falls back to fixed example text when blank, so the prompt
//! reads the same whether the insights came from the model or from defaults.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::crawler::SiteDocument;
use crate::insights::AIInsightSet;
use crate::pagespeed::{PerformanceDocument, PerformanceReport};

const SCORE_THRESHOLD: f64 = 70.0;
const LCP_THRESHOLD_SECS: f64 = 2.5;
const FID_THRESHOLD_MS: f64 = 100.0;
const CLS_THRESHOLD: f64 = 0.1;

/// Export format for a rendered prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PromptFormat {
    #[default]
    #[value(name = "txt")]
    Text,
    Json,
}

#[derive(Serialize)]
struct ExportedPrompt<'a> {
    prompt: &'a str,
    generated_at: String,
}

/// Serialize a prompt for download
///
/// # Arguments
///
/// * `prompt` - The rendered prompt
/// * `format` - Plain text or a JSON object `{"prompt", "generated_at"}`
/// * `generated_at` - Timestamp recorded in the JSON form
pub fn export_prompt(
    prompt: &str,
    format: PromptFormat,
    generated_at: DateTime<Utc>,
) -> serde_json::Result<String> {
    match format {
        PromptFormat::Text => Ok(prompt.to_string()),
        PromptFormat::Json => serde_json::to_string_pretty(&ExportedPrompt {
            prompt,
            generated_at: generated_at.to_rfc3339(),
        }),
    }
}

fn text_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { default } else { value }
}

fn join_or(items: &[String], default: &[&str]) -> String {
    let items: Vec<&str> = items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        default.join(", ")
    } else {
        items.join(", ")
    }
}

/// Format an integer with comma thousands separators
fn thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn vital_value(document: &PerformanceDocument, key: &str) -> f64 {
    document.vital(key).map(|vital| vital.value).unwrap_or(0.0)
}

/// Performance problems worth calling out in the prompt
pub fn performance_issues(report: Option<&PerformanceReport>) -> Vec<String> {
    let Some(report) = report else {
        return Vec::new();
    };
    let mut issues = Vec::new();

    let mobile = &report.mobile;
    let mobile_score = mobile.performance_score * 100.0;
    if mobile_score < SCORE_THRESHOLD {
        issues.push(format!(
            "Mobile performance score: {:.0}/100 (needs improvement)",
            mobile_score
        ));
    }

    let lcp = vital_value(mobile, "largest_contentful_paint");
    if lcp > LCP_THRESHOLD_SECS {
        issues.push(format!(
            "Largest Contentful Paint: {:.2}s (should be <2.5s)",
            lcp
        ));
    }
    let fid = vital_value(mobile, "first_input_delay");
    if fid > FID_THRESHOLD_MS {
        issues.push(format!("First Input Delay: {:.0}ms (should be <100ms)", fid));
    }
    let cls = vital_value(mobile, "cumulative_layout_shift");
    if cls > CLS_THRESHOLD {
        issues.push(format!(
            "Cumulative Layout Shift: {:.3} (should be <0.1)",
            cls
        ));
    }

    let desktop_score = report.desktop.performance_score * 100.0;
    if desktop_score < SCORE_THRESHOLD {
        issues.push(format!(
            "Desktop performance score: {:.0}/100 (needs improvement)",
            desktop_score
        ));
    }
    issues
}

fn overview(site: &SiteDocument) -> String {
    let page_types = if site.page_types_found.is_empty() {
        "None identified".to_string()
    } else {
        site.page_types_found
            .iter()
            .map(|page_type| page_type.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let keywords = &site.content_themes.top_keywords;
    let keywords = if keywords.is_empty() {
        "None identified".to_string()
    } else {
        keywords.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
    };

    format!(
        "- Pages analyzed: {}\n- Total word count: {}\n- Page types found: {}\n- Top keywords: {}",
        site.pages_analyzed,
        thousands(site.total_word_count),
        page_types,
        keywords
    )
}

/// Render the page-builder prompt
///
/// Pure and deterministic: the same inputs always produce the same text. A missing
/// performance report simply yields no performance issues.
pub fn synthesize(
    url: &str,
    performance: Option<&PerformanceReport>,
    site: &SiteDocument,
    insights: &AIInsightSet,
) -> String {
    let brand = &insights.brand_identity;
    let industry = &insights.industry_analysis;
    let audience = &insights.target_audience;
    let goals = &insights.website_goals;
    let value = &insights.value_propositions;
    let visual = &insights.visual_style;
    let content = &insights.content_strategy;
    let conversion = &insights.conversion_elements;
    let technical = &insights.technical_insights;

    let brand_colors = join_or(&brand.colors, &["#667eea", "#764ba2"]);
    let pain_points = join_or(
        &audience.pain_points,
        &["Need reliable professional services"],
    );
    let motivations = join_or(&audience.motivations, &["Business growth and success"]);
    let primary_ctas = join_or(&conversion.primary_ctas, &["Contact Us", "Get Quote"]);
    let trust_elements = join_or(
        &conversion.trust_elements,
        &["Testimonials", "Certifications"],
    );
    let benefits = join_or(&value.benefits, &["Quality service", "Professional results"]);
    let key_messages = join_or(
        &content.key_messages,
        &["Professional service", "Quality results"],
    );
    let content_themes = join_or(
        &content.content_themes,
        &["Professional expertise", "Quality service"],
    );
    let essential_features = join_or(
        &technical.essential_features,
        &["Contact forms", "Service pages", "About page"],
    );
    let performance_requirements = join_or(
        &technical.performance_requirements,
        &["Fast loading", "Mobile responsive"],
    );
    let seo_requirements = join_or(
        &technical.seo_requirements,
        &["Meta tags", "Structured data"],
    );

    let primary_vp = text_or(&value.primary_vp, "Professional and reliable service");
    let primary_goal = text_or(&goals.primary_goal, "Lead generation");
    let primary_audience = text_or(
        &audience.primary_audience,
        "Business owners and decision makers",
    );
    let primary_industry = text_or(&industry.primary_industry, "Professional Services");
    let design_style = text_or(&visual.design_style, "Modern and professional");
    let typography = text_or(&visual.typography, "Professional sans-serif fonts");
    let tone_of_voice = text_or(&content.tone_of_voice, "Professional and helpful");

    let issues = performance_issues(performance);
    let issues = if issues.is_empty() {
        "No major performance issues identified.".to_string()
    } else {
        issues
            .iter()
            .map(|issue| format!("- {}", issue))
            .collect::<Vec<_>>()
            .join("\n")
    };
    debug!("Rendering page builder prompt for {}", url);

    format!(
        "# Website Redesign AI Prompt

## Website Analysis: {url}

### Website Overview
{overview}

### Brand Identity & Visual Style
**Brand Tone:** {tone}
**Brand Personality:** {personality}
**Visual Style:** {design_style}
**Brand Colors:** {brand_colors}
**Typography:** {typography}

### Industry & Market Context
**Primary Industry:** {primary_industry}
**Market Position:** {market_position}
**Target Market:** {target_market}

### Target Audience
**Primary Audience:** {primary_audience}
**Demographics:** {demographics}
**Pain Points:** {pain_points}
**Motivations:** {motivations}

### Website Goals & Conversion Strategy
**Primary Goal:** {primary_goal}
**Conversion Actions:** {conversion_actions}
**Primary CTAs:** {primary_ctas}
**Trust Elements:** {trust_elements}

### Value Propositions & Messaging
**Primary Value Proposition:** {primary_vp}
**Unique Selling Point:** {usp}
**Key Benefits:** {benefits}
**Key Messages:** {key_messages}

### Content Strategy
**Content Themes:** {content_themes}
**Tone of Voice:** {tone_of_voice}
**Content Types:** {content_types}

### Technical Requirements
**Essential Features:** {essential_features}
**Performance Requirements:** {performance_requirements}
**SEO Requirements:** {seo_requirements}

### Performance Issues to Address
{issues}

## AI Page Builder Instructions

Create a modern, high-performing website that:

### Design & Visual Elements
- Use the specified brand colors: {brand_colors}
- Apply {apply_style} design style
- Use {use_typography}
- Implement {layout_style} layout
- Ensure brand consistency across all pages

### Target Audience Focus
- Design for {design_for}
- Address pain points: {pain_points}
- Appeal to motivations: {motivations}

### Conversion Optimization
- Primary goal: {primary_goal}
- Main CTAs: {primary_ctas}
- Include trust elements: {trust_elements}
- Implement conversion funnel: {conversion_funnel}

### Content Strategy
- Primary value proposition: {primary_vp}
- Key messages: {key_messages}
- Content themes: {content_themes}
- Tone: {tone_of_voice}

### Technical Excellence
- Essential features: {essential_features}
- Performance: {performance_requirements}
- SEO: {seo_requirements}
- Accessibility: {accessibility}

### Required Sections
1. **Hero Section** - Highlight {highlight}
2. **About Section** - Build trust and credibility
3. **Services/Products** - Detail offerings clearly
4. **Value Propositions** - Emphasize {benefits}
5. **Social Proof** - Include {trust_elements}
6. **Contact Section** - Clear {call_to_actions}

### Success Criteria
The website should:
- Convert visitors into {convert_into} effectively
- Rank well in search engines for target keywords
- Provide exceptional user experience across all devices
- Load quickly and perform optimally
- Represent the brand professionally and build trust
- Address the specific needs of {needs_of}

Create a website that combines beautiful design with strategic functionality, optimized for both search engines and user conversions in the {industry_of} industry.",
        overview = overview(site),
        tone = text_or(&brand.tone, "Professional and trustworthy"),
        personality = text_or(&brand.personality, "Reliable and professional"),
        market_position = text_or(&industry.market_position, "Professional service provider"),
        target_market = text_or(
            &industry.target_market,
            "Businesses seeking professional services"
        ),
        demographics = text_or(
            &audience.demographics,
            "Adults 25-65, business professionals"
        ),
        conversion_actions = join_or(
            &goals.conversion_actions,
            &["Contact form submission", "Phone call"]
        ),
        usp = text_or(&value.usp, "Professional expertise and reliability"),
        content_types = join_or(
            &content.content_types,
            &["Service pages", "About page", "Contact information"]
        ),
        apply_style = text_or(&visual.design_style, "modern and professional"),
        use_typography = text_or(&visual.typography, "professional sans-serif fonts"),
        layout_style = text_or(&visual.layout_style, "clean and organized"),
        design_for = text_or(
            &audience.primary_audience,
            "business owners and decision makers"
        ),
        highlight = text_or(&value.primary_vp, "primary value proposition"),
        convert_into = text_or(&goals.primary_goal, "leads"),
        needs_of = text_or(&audience.primary_audience, "the target audience"),
        industry_of = text_or(&industry.primary_industry, "professional services"),
        conversion_funnel = join_or(
            &goals.conversion_funnel,
            &["Landing page", "Service pages", "Contact form"]
        ),
        accessibility = join_or(
            &technical.accessibility,
            &["Alt text", "Keyboard navigation"]
        ),
        call_to_actions = join_or(&goals.call_to_actions, &["call-to-actions"]),
    )
}
