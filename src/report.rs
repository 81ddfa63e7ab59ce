//! # Audit Report
//!
//! Collects every artifact of an audit run into one serializable document, together with
//! summary scores, key findings and a deduplicated recommendation list.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crawler::{PageType, SiteDocument};
use crate::error::Result;
use crate::insights::{self, AIInsightSet, ContentAnalysis};
use crate::pagespeed::{Impact, PerformanceDocument, PerformanceReport, Strategy};
use crate::seo::{self, SeoAssessment};
use crate::style::StyleSummary;

const REPORT_VERSION: &str = "1.0";
const GENERATOR: &str = "site-audit";
const MAX_FINDINGS: usize = 5;
const OPPORTUNITIES_PER_DEVICE: usize = 3;
const THIN_CONTENT_WORDS: f64 = 300.0;
const ESSENTIAL_PAGES: [PageType; 3] = [PageType::About, PageType::Contact, PageType::Services];

/// Verbal grade of a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreStatus {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
    Poor,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl ScoreStatus {
    pub fn from_score(score: Option<u8>) -> Self {
        match score {
            None => ScoreStatus::NotAvailable,
            Some(s) if s >= 90 => ScoreStatus::Excellent,
            Some(s) if s >= 70 => ScoreStatus::Good,
            Some(s) if s >= 50 => ScoreStatus::NeedsImprovement,
            Some(_) => ScoreStatus::Poor,
        }
    }
}

/// One score with its grade; `score` is absent when nothing was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCell {
    pub score: Option<u8>,
    pub status: ScoreStatus,
}

impl ScoreCell {
    fn new(score: Option<u8>) -> Self {
        Self {
            score,
            status: ScoreStatus::from_score(score),
        }
    }

    fn from_fraction(fraction: Option<f64>) -> Self {
        Self::new(fraction.map(|f| (f * 100.0).clamp(0.0, 100.0) as u8))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceScores {
    pub mobile: ScoreCell,
    pub desktop: ScoreCell,
}

impl DeviceScores {
    fn collect(
        performance: Option<&PerformanceReport>,
        score: impl Fn(&PerformanceDocument) -> f64,
    ) -> Self {
        Self {
            mobile: ScoreCell::from_fraction(performance.map(|p| score(&p.mobile))),
            desktop: ScoreCell::from_fraction(performance.map(|p| score(&p.desktop))),
        }
    }
}

/// Lighthouse category scores per device, plus the rule-based SEO score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryScores {
    #[serde(rename = "Performance")]
    pub performance: DeviceScores,
    #[serde(rename = "SEO")]
    pub seo: DeviceScores,
    #[serde(rename = "Accessibility")]
    pub accessibility: DeviceScores,
    #[serde(rename = "Best Practices")]
    pub best_practices: DeviceScores,
    #[serde(rename = "Content SEO")]
    pub content_seo: ScoreCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub version: String,
    pub generator: String,
    pub pages_analyzed: usize,
}

/// Everything one audit run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub url: String,
    pub generated_at: DateTime<Utc>,
    pub site: SiteDocument,
    pub style: Option<StyleSummary>,
    pub seo: SeoAssessment,
    pub content_analysis: ContentAnalysis,
    pub performance: Option<PerformanceReport>,
    pub ai_insights: AIInsightSet,
    pub summary_scores: SummaryScores,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub report_metadata: ReportMetadata,
}

impl AuditReport {
    /// Assemble a report; SEO assessment and content analysis are derived here
    pub fn build(
        url: &str,
        site: SiteDocument,
        style: Option<StyleSummary>,
        performance: Option<PerformanceReport>,
        ai_insights: AIInsightSet,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let seo = seo::assess(&site);
        let content_analysis = insights::content_analysis(&site);
        let summary_scores = summary_scores(performance.as_ref(), &seo);
        let key_findings = key_findings(&site, performance.as_ref());
        let recommendations = recommendations(&seo, performance.as_ref(), &ai_insights);
        let report_metadata = ReportMetadata {
            version: REPORT_VERSION.to_string(),
            generator: GENERATOR.to_string(),
            pages_analyzed: site.pages_analyzed,
        };

        Self {
            url: url.to_string(),
            generated_at,
            site,
            style,
            seo,
            content_analysis,
            performance,
            ai_insights,
            summary_scores,
            key_findings,
            recommendations,
            report_metadata,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON report to `path`
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json_pretty()?)?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

fn summary_scores(performance: Option<&PerformanceReport>, seo: &SeoAssessment) -> SummaryScores {
    SummaryScores {
        performance: DeviceScores::collect(performance, |d| d.performance_score),
        seo: DeviceScores::collect(performance, |d| d.seo_score),
        accessibility: DeviceScores::collect(performance, |d| d.accessibility_score),
        best_practices: DeviceScores::collect(performance, |d| d.best_practices_score),
        content_seo: ScoreCell::new(Some(seo.score)),
    }
}

/// At most five headline problems of the site
pub fn key_findings(site: &SiteDocument, performance: Option<&PerformanceReport>) -> Vec<String> {
    let mut findings = Vec::new();

    if let Some(report) = performance {
        let mobile = report.mobile.performance_score * 100.0;
        if mobile < 50.0 {
            findings.push("Mobile performance needs significant improvement".to_string());
        } else if mobile < 90.0 {
            findings.push("Mobile performance has room for optimization".to_string());
        }
    }

    let missing_titles = site
        .pages
        .iter()
        .filter(|page| page.title.trim().is_empty())
        .count();
    if missing_titles > 0 {
        findings.push(format!("{} pages missing title tags", missing_titles));
    }

    let missing_descriptions = site
        .pages
        .iter()
        .filter(|page| page.meta_description.trim().is_empty())
        .count();
    if missing_descriptions > 0 {
        findings.push(format!(
            "{} pages missing meta descriptions",
            missing_descriptions
        ));
    }

    if site.pages_analyzed > 0 && site.content_themes.avg_words_per_page < THIN_CONTENT_WORDS {
        findings.push(
            "Content is generally thin - pages need more comprehensive content".to_string(),
        );
    }

    let missing_pages = ESSENTIAL_PAGES
        .iter()
        .filter(|page_type| !site.page_types_found.contains(page_type))
        .count();
    if missing_pages > 0 {
        findings.push(format!("{} essential pages are missing", missing_pages));
    }

    findings.truncate(MAX_FINDINGS);
    findings
}

/// Top HIGH and MEDIUM opportunities of each device, labelled with the device
fn performance_recommendations(report: &PerformanceReport) -> Vec<String> {
    [Strategy::Mobile, Strategy::Desktop]
        .into_iter()
        .flat_map(|strategy| {
            report
                .document(strategy)
                .opportunities
                .iter()
                .take(OPPORTUNITIES_PER_DEVICE)
                .filter(|opportunity| opportunity.impact >= Impact::Medium)
                .map(move |opportunity| format!("{} ({})", opportunity.title, strategy))
        })
        .collect()
}

/// SEO advice, then performance opportunities, then insight-driven advice, without repeats
pub fn recommendations(
    seo: &SeoAssessment,
    performance: Option<&PerformanceReport>,
    ai_insights: &AIInsightSet,
) -> Vec<String> {
    let mut seen = HashSet::new();
    seo.recommendations
        .iter()
        .cloned()
        .chain(performance.map(performance_recommendations).unwrap_or_default())
        .chain(insights::recommendations(ai_insights))
        .filter(|recommendation| seen.insert(recommendation.clone()))
        .collect()
}
