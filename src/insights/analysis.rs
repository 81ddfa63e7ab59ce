//! Deterministic content analysis and the recommendations derived from an insight set

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::crawler::{PageType, SiteDocument};
use crate::insights::AIInsightSet;

const THEMES: [(&str, [&str; 4]); 5] = [
    ("services", ["service", "services", "consulting", "solution"]),
    ("business", ["business", "professional", "company", "enterprise"]),
    ("quality", ["quality", "expertise", "professional", "reliable"]),
    ("contact", ["contact", "phone", "email", "address"]),
    ("about", ["about", "team", "experience", "history"]),
];

/// Pages of one type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTypeSummary {
    pub count: usize,
    pub total_words: usize,
    /// Non-empty titles in crawl order
    pub titles: Vec<String>,
}

/// Keyword themes and per-type page statistics of a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    /// Theme name to the theme keywords found in the page text
    pub content_themes: BTreeMap<String, Vec<String>>,
    pub page_analysis: BTreeMap<PageType, PageTypeSummary>,
}

/// Analyze which business themes the site text touches and how pages are distributed
pub fn content_analysis(site: &SiteDocument) -> ContentAnalysis {
    let text = site
        .pages
        .iter()
        .map(|page| page.body_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let content_themes = THEMES
        .iter()
        .filter_map(|(theme, keywords)| {
            let found: Vec<String> = keywords
                .iter()
                .filter(|keyword| text.contains(*keyword))
                .map(|keyword| keyword.to_string())
                .collect();
            (!found.is_empty()).then(|| (theme.to_string(), found))
        })
        .collect();

    let mut page_analysis: BTreeMap<PageType, PageTypeSummary> = BTreeMap::new();
    for page in &site.pages {
        let summary = page_analysis.entry(page.page_type).or_default();
        summary.count += 1;
        summary.total_words += page.word_count;
        if !page.title.trim().is_empty() {
            summary.titles.push(page.title.clone());
        }
    }

    ContentAnalysis {
        content_themes,
        page_analysis,
    }
}

/// High-level redesign advice backed by the insight set
pub fn recommendations(insights: &AIInsightSet) -> Vec<String> {
    let mut recommendations = Vec::new();

    if !insights.brand_identity.tone.is_empty() || !insights.brand_identity.colors.is_empty() {
        recommendations.push("Implement consistent brand identity across all pages".to_string());
    }
    let goal = insights.website_goals.primary_goal.trim();
    if !goal.is_empty() {
        recommendations.push(format!("Optimize website for primary goal: {}", goal));
    }
    if !insights.target_audience.primary_audience.is_empty() {
        recommendations.push("Create content tailored to identified target audience".to_string());
    }
    if !insights.value_propositions.primary_vp.is_empty() {
        recommendations.push("Prominently display value propositions on homepage".to_string());
    }
    if !insights.conversion_elements.primary_ctas.is_empty() {
        recommendations.push("Implement strategic call-to-action buttons".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::PageRecord;

    fn page(page_type: PageType, title: &str, body: &str, words: usize) -> PageRecord {
        PageRecord {
            title: title.to_string(),
            body_text: body.to_string(),
            word_count: words,
            page_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_content_analysis() {
        let site = SiteDocument {
            pages: vec![
                page(PageType::Home, "Acme", "Professional consulting Services", 3),
                page(PageType::Other, "", "Call our team by Phone", 5),
                page(PageType::Other, "Legal", "Terms", 1),
            ],
            ..Default::default()
        };
        let analysis = content_analysis(&site);

        assert_eq!(
            analysis.content_themes["services"],
            vec!["service", "services", "consulting"]
        );
        assert_eq!(analysis.content_themes["business"], vec!["professional"]);
        assert_eq!(analysis.content_themes["quality"], vec!["professional"]);
        assert_eq!(analysis.content_themes["contact"], vec!["phone"]);
        assert_eq!(analysis.content_themes["about"], vec!["team"]);

        let other = &analysis.page_analysis[&PageType::Other];
        assert_eq!(other.count, 2);
        assert_eq!(other.total_words, 6);
        assert_eq!(other.titles, vec!["Legal"]);
        assert_eq!(analysis.page_analysis[&PageType::Home].count, 1);
    }

    #[test]
    fn test_content_analysis_without_themes() {
        let site = SiteDocument {
            pages: vec![page(PageType::Blog, "Log", "nothing relevant", 2)],
            ..Default::default()
        };
        assert!(content_analysis(&site).content_themes.is_empty());
    }

    #[test]
    fn test_recommendations_for_default_insights() {
        let recommendations = recommendations(&AIInsightSet::default());
        assert_eq!(
            recommendations,
            vec![
                "Implement consistent brand identity across all pages",
                "Optimize website for primary goal: Lead generation",
                "Create content tailored to identified target audience",
                "Prominently display value propositions on homepage",
                "Implement strategic call-to-action buttons",
            ]
        );
    }
}
