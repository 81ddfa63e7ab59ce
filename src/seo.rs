//! Rule-based SEO and quality scoring of a crawled site
//!
//! [`assess`] is a pure function of the [`SiteDocument`]. Each rule yields either an
//! issue or a strength; the score loses ten points per issue.

use serde::{Deserialize, Serialize};

use crate::crawler::SiteDocument;

const MAX_DESCRIPTION_CHARS: usize = 160;
const MAX_TITLE_CHARS: usize = 60;

/// Advice per issue keyword; the first keyword found in an issue decides its advice
const RECOMMENDATIONS: [(&str, &str); 5] = [
    (
        "meta description",
        "Add a compelling meta description of 150-160 characters that summarizes the page content",
    ),
    (
        "title",
        "Create descriptive, unique titles of 50-60 characters for each page",
    ),
    (
        "h1",
        "Use exactly one H1 tag per page that clearly describes the page content",
    ),
    (
        "alt text",
        "Add descriptive alt text to all images for better accessibility and SEO",
    ),
    (
        "https",
        "Implement HTTPS to improve security and search rankings",
    ),
];

/// Outcome of the SEO rules for one site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoAssessment {
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
    /// `max(0, 100 - 10 * issues.len())`
    pub score: u8,
    pub recommendations: Vec<String>,
}

/// Assess a site document against the fixed SEO rules
pub fn assess(site: &SiteDocument) -> SeoAssessment {
    let mut issues = Vec::new();
    let mut strengths = Vec::new();

    match site.meta_tags.get("description").map(|d| d.trim()) {
        None | Some("") => issues.push("Missing meta description".to_string()),
        Some(description) if description.chars().count() > MAX_DESCRIPTION_CHARS => {
            issues.push("Meta description too long (>160 characters)".to_string())
        }
        Some(_) => strengths.push("Meta description present and appropriate length".to_string()),
    }

    if let Some(home) = site.home_page() {
        let title = home.title.trim();
        if title.is_empty() {
            issues.push("Missing page title".to_string());
        } else if title.chars().count() > MAX_TITLE_CHARS {
            issues.push("Page title too long (>60 characters)".to_string());
        } else {
            strengths.push("Page title present and appropriate length".to_string());
        }
    }

    let h1_count: usize = site.pages.iter().map(|page| page.headings.h1.len()).sum();
    if h1_count == 0 {
        issues.push("No H1 tags found".to_string());
    } else if h1_count > site.pages.len() {
        issues.push("Multiple H1 tags found on some pages".to_string());
    } else {
        strengths.push("Appropriate H1 tag usage".to_string());
    }

    let images_without_alt = site
        .pages
        .iter()
        .flat_map(|page| &page.images)
        .filter(|image| !image.has_alt)
        .count();
    if images_without_alt > 0 {
        issues.push(format!("{} images missing alt text", images_without_alt));
    } else {
        strengths.push("All images have alt text".to_string());
    }

    if site.pages.iter().any(|page| page.url.starts_with("https://")) {
        strengths.push("Site uses HTTPS".to_string());
    } else {
        issues.push("Site not using HTTPS".to_string());
    }

    let score = 100usize.saturating_sub(10 * issues.len()) as u8;
    let recommendations = recommendations_for(&issues);

    SeoAssessment {
        issues,
        strengths,
        score,
        recommendations,
    }
}

fn recommendations_for(issues: &[String]) -> Vec<String> {
    issues
        .iter()
        .filter_map(|issue| {
            let issue = issue.to_lowercase();
            RECOMMENDATIONS
                .iter()
                .find(|(keyword, _)| issue.contains(keyword))
                .map(|(_, advice)| advice.to_string())
        })
        .collect()
}
