//! Content digest and per-category prompt templates

use serde_json::Value;

use crate::crawler::SiteDocument;
use crate::insights::InsightCategory;

/// Placeholder shown to the model for one field of the JSON skeleton
enum Example {
    Text(&'static str),
    List(&'static [&'static str]),
}

struct Field {
    key: &'static str,
    example: Example,
    focus: &'static str,
}

struct Template {
    subject: &'static str,
    fields: [Field; 7],
}

use Example::{List, Text};

const fn field(key: &'static str, example: Example, focus: &'static str) -> Field {
    Field {
        key,
        example,
        focus,
    }
}

const BRAND_IDENTITY: Template = Template {
    subject: "provide detailed brand identity insights",
    fields: [
        field("colors", List(&["#color1", "#color2"]), "Brand Colors: Primary and secondary brand colors"),
        field("tone", Text("professional/friendly/luxury/etc"), "Brand Tone: Professional, friendly, luxury, etc."),
        field("personality", Text("reliable/professional/innovative/etc"), "Brand Personality: Reliable, professional, innovative, etc."),
        field("values", List(&["value1", "value2", "value3"]), "Brand Values: Core values the brand represents"),
        field("positioning", Text("how the brand positions itself"), "Brand Positioning: How the brand positions itself in the market"),
        field("visual_style", Text("clean/modern/classic/etc"), "Visual Style: Overall visual aesthetic and style"),
        field("messaging", Text("key brand messages and themes"), "Brand Messaging: Key brand messages and themes"),
    ],
};

const INDUSTRY_ANALYSIS: Template = Template {
    subject: "determine the industry and market context",
    fields: [
        field("primary_industry", Text("main industry name"), "Primary Industry: Main industry this business operates in"),
        field("sub_industry", Text("specific niche or sub-industry"), "Sub-industry: Specific niche or sub-industry"),
        field("market_position", Text("how business positions itself"), "Market Position: How this business positions itself in the market"),
        field("competitors", Text("type of competitors"), "Competitors: Type of competitors this business might have"),
        field("trends", Text("relevant industry trends"), "Industry Trends: Relevant trends in this industry"),
        field("target_market", Text("market segment served"), "Target Market: Market segment this business serves"),
        field("challenges", Text("common industry challenges"), "Industry Challenges: Common challenges in this industry"),
    ],
};

const TARGET_AUDIENCE: Template = Template {
    subject: "identify the target audience",
    fields: [
        field("primary_audience", Text("main target audience"), "Primary Audience: Who is the main target audience?"),
        field("demographics", Text("age range, gender, income level, education"), "Demographics: Age range, gender, income level, education"),
        field("psychographics", Text("values, interests, lifestyle"), "Psychographics: Values, interests, lifestyle, personality traits"),
        field("pain_points", List(&["pain point 1", "pain point 2"]), "Pain Points: What problems does this audience face?"),
        field("motivations", List(&["motivation 1", "motivation 2"]), "Motivations: What motivates this audience to take action?"),
        field("decision_makers", Text("who makes purchasing decisions"), "Decision Makers: Who makes the purchasing decisions?"),
        field("user_personas", List(&["persona 1", "persona 2"]), "User Personas: Create 2-3 detailed user personas"),
    ],
};

const WEBSITE_GOALS: Template = Template {
    subject: "identify the website's primary goals",
    fields: [
        field("primary_goal", Text("lead generation/sales/awareness/etc"), "Primary Goal: What is the main conversion goal (lead generation, sales, awareness, etc.)?"),
        field("secondary_goals", List(&["goal1", "goal2"]), "Secondary Goals: What are secondary objectives?"),
        field("conversion_actions", List(&["action1", "action2"]), "Conversion Actions: What specific actions should visitors take?"),
        field("success_metrics", List(&["metric1", "metric2"]), "Success Metrics: How would success be measured?"),
        field("user_journey", Text("ideal path from first visit to conversion"), "User Journey: What is the ideal user journey?"),
        field("call_to_actions", List(&["cta1", "cta2"]), "Call-to-Actions: What types of CTAs would be most effective?"),
        field("conversion_funnel", List(&["stage1", "stage2", "stage3"]), "Conversion Funnel: Describe the conversion funnel stages"),
    ],
};

const VALUE_PROPOSITIONS: Template = Template {
    subject: "identify its value propositions",
    fields: [
        field("primary_vp", Text("main value proposition"), "Primary Value Proposition: What is the main value proposition?"),
        field("secondary_vps", List(&["vp1", "vp2"]), "Secondary Value Props: What are additional value propositions?"),
        field("usp", Text("what makes this business unique"), "Unique Selling Points: What makes this business unique?"),
        field("benefits", List(&["benefit1", "benefit2"]), "Benefits: What benefits do customers receive?"),
        field("competitive_advantages", List(&["advantage1", "advantage2"]), "Competitive Advantages: What advantages over competitors?"),
        field("trust_signals", List(&["signal1", "signal2"]), "Trust Signals: What builds trust and credibility?"),
        field("proof_points", List(&["proof1", "proof2"]), "Proof Points: What evidence supports the value propositions?"),
    ],
};

const VISUAL_STYLE: Template = Template {
    subject: "determine visual style preferences",
    fields: [
        field("color_palette", List(&["#color1", "#color2", "#color3"]), "Color Palette: What colors would work best for this brand"),
        field("typography", Text("font style description"), "Typography: What font styles would be appropriate"),
        field("layout_style", Text("layout approach description"), "Layout Style: What layout approach would work best"),
        field("visual_elements", Text("types of images and graphics"), "Visual Elements: What types of images and graphics"),
        field("design_style", Text("modern/classic/minimalist/bold/etc"), "Design Style: Modern, classic, minimalist, bold, etc."),
        field("brand_consistency", Text("how to maintain visual consistency"), "Brand Consistency: How to maintain visual consistency"),
        field("visual_hierarchy", Text("how to organize visual elements"), "Visual Hierarchy: How to organize visual elements"),
    ],
};

const CONTENT_STRATEGY: Template = Template {
    subject: "develop a content strategy",
    fields: [
        field("key_messages", List(&["message1", "message2", "message3"]), "Key Messages: Main messages to communicate"),
        field("content_themes", List(&["theme1", "theme2", "theme3"]), "Content Themes: Themes the content should focus on"),
        field("content_types", List(&["type1", "type2", "type3"]), "Content Types: Types of content that would be most effective"),
        field("tone_of_voice", Text("how the content should sound"), "Tone of Voice: How the content should sound"),
        field("content_structure", Text("how content should be organized"), "Content Structure: How content should be organized"),
        field("call_to_actions", List(&["cta1", "cta2", "cta3"]), "Call-to-Actions: CTAs that would be most effective"),
        field("content_gaps", List(&["gap1", "gap2", "gap3"]), "Content Gaps: Content that is missing or needs improvement"),
    ],
};

const CONVERSION_ELEMENTS: Template = Template {
    subject: "identify conversion optimization opportunities",
    fields: [
        field("primary_ctas", List(&["cta1", "cta2"]), "Primary CTAs: What should be the main call-to-action buttons?"),
        field("secondary_ctas", List(&["cta1", "cta2"]), "Secondary CTAs: What additional CTAs would be helpful?"),
        field("trust_elements", List(&["element1", "element2"]), "Trust Elements: What trust signals should be included?"),
        field("social_proof", List(&["proof1", "proof2"]), "Social Proof: What social proof elements would work?"),
        field("urgency_elements", List(&["element1", "element2"]), "Urgency Elements: What urgency or scarcity elements?"),
        field("lead_magnets", List(&["magnet1", "magnet2"]), "Lead Magnets: What lead magnets would be effective?"),
        field("conversion_funnel", List(&["stage1", "stage2", "stage3"]), "Conversion Funnel: How to optimize the conversion funnel?"),
    ],
};

const TECHNICAL_INSIGHTS: Template = Template {
    subject: "identify technical requirements",
    fields: [
        field("essential_features", List(&["feature1", "feature2"]), "Essential Features: What features are essential for this website?"),
        field("integration_needs", List(&["integration1", "integration2"]), "Integration Needs: What integrations might be needed?"),
        field("performance_requirements", List(&["requirement1", "requirement2"]), "Performance Requirements: What performance standards are needed?"),
        field("seo_requirements", List(&["requirement1", "requirement2"]), "SEO Requirements: What SEO elements are important?"),
        field("accessibility", List(&["feature1", "feature2"]), "Accessibility: What accessibility features are needed?"),
        field("mobile_requirements", List(&["requirement1", "requirement2"]), "Mobile Requirements: What mobile-specific features?"),
        field("security_needs", List(&["measure1", "measure2"]), "Security Needs: What security measures are important?"),
    ],
};

fn template(category: InsightCategory) -> &'static Template {
    match category {
        InsightCategory::BrandIdentity => &BRAND_IDENTITY,
        InsightCategory::IndustryAnalysis => &INDUSTRY_ANALYSIS,
        InsightCategory::TargetAudience => &TARGET_AUDIENCE,
        InsightCategory::WebsiteGoals => &WEBSITE_GOALS,
        InsightCategory::ValuePropositions => &VALUE_PROPOSITIONS,
        InsightCategory::VisualStyle => &VISUAL_STYLE,
        InsightCategory::ContentStrategy => &CONTENT_STRATEGY,
        InsightCategory::ConversionElements => &CONVERSION_ELEMENTS,
        InsightCategory::TechnicalInsights => &TECHNICAL_INSIGHTS,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Summarize a crawled site for the model
///
/// # Arguments
///
/// * `site` - The aggregated crawl result
/// * `page_content_chars` - Body text quoted per page
/// * `max_chars` - Cap on the whole digest
pub fn build_digest(site: &SiteDocument, page_content_chars: usize, max_chars: usize) -> String {
    let mut parts = vec![format!("Website URL: {}", site.base_url)];

    for page in &site.pages {
        parts.push(format!(
            "\n--- {} PAGE ---",
            page.page_type.as_str().to_uppercase()
        ));
        parts.push(format!("Title: {}", page.title));
        parts.push(format!("Meta Description: {}", page.meta_description));
        let headings = serde_json::to_string_pretty(&page.headings).unwrap_or_default();
        parts.push(format!("Headings: {}", headings));
        parts.push(format!(
            "Content: {}...",
            truncate_chars(&page.body_text, page_content_chars)
        ));
    }

    if !site.meta_tags.is_empty() {
        parts.push("\n--- META TAGS ---".to_string());
        parts.push(serde_json::to_string_pretty(&site.meta_tags).unwrap_or_default());
    }

    let digest = parts.join("\n");
    truncate_chars(&digest, max_chars).to_string()
}

fn skeleton(template: &Template) -> String {
    let lines: Vec<String> = template
        .fields
        .iter()
        .map(|field| {
            let example = match &field.example {
                Text(text) => Value::from(*text),
                List(items) => Value::from(items.to_vec()),
            };
            format!("  \"{}\": {}", field.key, example)
        })
        .collect();
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// Build the prompt asking for one insight category
pub fn category_prompt(category: InsightCategory, digest: &str) -> String {
    let template = template(category);
    let focus: Vec<String> = template
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{}. {}", i + 1, field.focus))
        .collect();

    format!(
        "Analyze the following website content and {}.\n\n\
         Website Content:\n{}\n\n\
         Please provide the following information in EXACT JSON format \
         (no additional text, just JSON):\n\n{}\n\n\
         Focus on identifying:\n{}\n\n\
         Return ONLY valid JSON with the exact structure shown above.",
        template.subject,
        digest,
        skeleton(template),
        focus.join("\n")
    )
}

/// JSON keys the prompt for `category` asks for, in order
pub fn category_keys(category: InsightCategory) -> Vec<&'static str> {
    template(category).fields.iter().map(|field| field.key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{PageRecord, PageType};
    use crate::insights::{
        BrandIdentity, ContentStrategy, ConversionElements, IndustryAnalysis, TargetAudience,
        TechnicalInsights, ValuePropositions, VisualStyle, WebsiteGoals,
    };
    use serde::Serialize;

    fn record_keys<R: Serialize + Default>() -> Vec<String> {
        match serde_json::to_value(R::default()).unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => panic!("record must serialize to an object"),
        }
    }

    fn sorted(keys: Vec<&str>) -> Vec<String> {
        let mut keys: Vec<String> = keys.into_iter().map(str::to_string).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_templates_match_record_fields() {
        let expected = [
            record_keys::<BrandIdentity>(),
            record_keys::<IndustryAnalysis>(),
            record_keys::<TargetAudience>(),
            record_keys::<WebsiteGoals>(),
            record_keys::<ValuePropositions>(),
            record_keys::<VisualStyle>(),
            record_keys::<ContentStrategy>(),
            record_keys::<ConversionElements>(),
            record_keys::<TechnicalInsights>(),
        ];
        for (category, mut fields) in InsightCategory::ALL.into_iter().zip(expected) {
            fields.sort();
            assert_eq!(sorted(category_keys(category)), fields, "{}", category);
        }
    }

    fn sample_site() -> SiteDocument {
        let mut home = PageRecord {
            url: "https://acme.test/".to_string(),
            title: "Acme Widgets".to_string(),
            meta_description: "Widgets for everyone".to_string(),
            body_text: "é".repeat(30),
            page_type: PageType::Home,
            ..Default::default()
        };
        home.headings.push(1, "Welcome".to_string());
        let mut site = SiteDocument {
            base_url: "https://acme.test".to_string(),
            pages: vec![home],
            ..Default::default()
        };
        site.meta_tags
            .insert("description".to_string(), "Widgets for everyone".to_string());
        site
    }

    #[test]
    fn test_build_digest() {
        let digest = build_digest(&sample_site(), 10, 10_000);
        assert!(digest.starts_with("Website URL: https://acme.test\n\n--- HOME PAGE ---\n"));
        assert!(digest.contains("Title: Acme Widgets\nMeta Description: Widgets for everyone"));
        assert!(digest.contains("\"Welcome\""));
        assert!(digest.contains(&format!("Content: {}...", "é".repeat(10))));
        assert!(digest.contains("\n--- META TAGS ---\n"));
    }

    #[test]
    fn test_build_digest_is_capped() {
        let digest = build_digest(&sample_site(), 2_000, 40);
        assert_eq!(digest.chars().count(), 40);
    }

    #[test]
    fn test_category_prompt() {
        let prompt = category_prompt(InsightCategory::BrandIdentity, "DIGEST");
        assert!(prompt.starts_with(
            "Analyze the following website content and provide detailed brand identity insights."
        ));
        assert!(prompt.contains("Website Content:\nDIGEST\n"));
        assert!(prompt.contains("  \"colors\": [\"#color1\",\"#color2\"],\n"));
        assert!(prompt.contains("1. Brand Colors: Primary and secondary brand colors"));
        assert!(prompt.contains("7. Brand Messaging: Key brand messages and themes"));
        assert!(prompt.ends_with("Return ONLY valid JSON with the exact structure shown above."));
    }
}
