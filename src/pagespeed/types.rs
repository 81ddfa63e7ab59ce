//! Normalized PageSpeed documents and the raw wire shapes they are built from

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Device profile a measurement is run for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mobile" => Ok(Strategy::Mobile),
            "desktop" => Ok(Strategy::Desktop),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Expected benefit of an opportunity, ordered from least to most
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Impact {
    Minimal,
    Low,
    Medium,
    High,
}

impl Impact {
    /// Tier for the given savings; thresholds are exclusive
    pub fn classify(savings_ms: f64, savings_kb: f64) -> Self {
        if savings_ms > 1000.0 || savings_kb > 100.0 {
            Impact::High
        } else if savings_ms > 500.0 || savings_kb > 50.0 {
            Impact::Medium
        } else if savings_ms > 100.0 || savings_kb > 10.0 {
            Impact::Low
        } else {
            Impact::Minimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Minimal => "MINIMAL",
            Impact::Low => "LOW",
            Impact::Medium => "MEDIUM",
            Impact::High => "HIGH",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lab-measured Core Web Vital
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalMetric {
    /// Seconds for LCP, FCP and TTI; raw audit units otherwise
    pub value: f64,
    pub score: f64,
    pub display_value: String,
    pub description: String,
}

/// A field-data percentile reported by real users
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealUserMetric {
    pub percentile: f64,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    /// Raw audit value, milliseconds for timings
    pub value: f64,
    pub score: f64,
    pub display_value: String,
    pub title: String,
    pub description: String,
}

/// A failed audit with estimated savings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub score: f64,
    pub display_value: String,
    pub savings_ms: f64,
    pub savings_kb: f64,
    pub impact: Impact,
    /// Up to five offending resources
    pub items: Vec<Value>,
}

/// Diagnostic, SEO or accessibility audit result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub score: Option<f64>,
    pub score_display_mode: String,
    pub display_value: String,
    pub details: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMetric {
    pub percentile: f64,
    pub category: String,
    pub distributions: Vec<Value>,
}

/// Real-user loading experience of the origin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadingExperience {
    pub overall_category: String,
    /// Metric name lower-cased, e.g. `largest_contentful_paint_ms`
    pub metrics: BTreeMap<String, FieldMetric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub total_byte_weight: f64,
    pub image_count: usize,
    pub script_count: usize,
    pub stylesheet_count: usize,
    pub font_count: usize,
    pub total_requests: usize,
}

/// Normalized result of one PageSpeed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceDocument {
    pub url: String,
    pub strategy: Strategy,
    pub fetch_time: Option<String>,
    pub lighthouse_version: Option<String>,
    pub performance_score: f64,
    pub accessibility_score: f64,
    pub best_practices_score: f64,
    pub seo_score: f64,
    pub core_web_vitals: BTreeMap<String, VitalMetric>,
    /// `fcp_real_user` and `fid_real_user` when field data exists
    pub real_user_vitals: BTreeMap<String, RealUserMetric>,
    pub performance_metrics: BTreeMap<String, PerformanceMetric>,
    /// Sorted by impact, highest first
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Vec<AuditSummary>,
    pub seo_audits: Vec<AuditSummary>,
    pub accessibility_audits: Vec<AuditSummary>,
    pub loading_experience: Option<LoadingExperience>,
    pub resource_summary: ResourceSummary,
    pub api_key_used: bool,
}

impl PerformanceDocument {
    pub fn vital(&self, key: &str) -> Option<&VitalMetric> {
        self.core_web_vitals.get(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallScores {
    pub avg_performance: f64,
    pub avg_accessibility: f64,
    pub avg_seo: f64,
    pub avg_best_practices: f64,
}

/// Desktop minus mobile, per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub performance_diff: f64,
    pub accessibility_diff: f64,
    pub seo_diff: f64,
    pub best_practices_diff: f64,
}

/// Mobile and desktop measurements of one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub url: String,
    pub mobile: PerformanceDocument,
    pub desktop: PerformanceDocument,
    pub overall: OverallScores,
    pub comparison: StrategyComparison,
}

impl PerformanceReport {
    pub fn new(url: &str, mobile: PerformanceDocument, desktop: PerformanceDocument) -> Self {
        let overall = OverallScores {
            avg_performance: (mobile.performance_score + desktop.performance_score) / 2.0,
            avg_accessibility: (mobile.accessibility_score + desktop.accessibility_score) / 2.0,
            avg_seo: (mobile.seo_score + desktop.seo_score) / 2.0,
            avg_best_practices: (mobile.best_practices_score + desktop.best_practices_score)
                / 2.0,
        };
        let comparison = StrategyComparison {
            performance_diff: desktop.performance_score - mobile.performance_score,
            accessibility_diff: desktop.accessibility_score - mobile.accessibility_score,
            seo_diff: desktop.seo_score - mobile.seo_score,
            best_practices_diff: desktop.best_practices_score - mobile.best_practices_score,
        };
        Self {
            url: url.to_string(),
            mobile,
            desktop,
            overall,
            comparison,
        }
    }

    pub fn document(&self, strategy: Strategy) -> &PerformanceDocument {
        match strategy {
            Strategy::Mobile => &self.mobile,
            Strategy::Desktop => &self.desktop,
        }
    }
}

/// Top-level PageSpeed API response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawResponse {
    pub lighthouse_result: RawLighthouseResult,
    pub loading_experience: Option<RawLoadingExperience>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawLighthouseResult {
    pub categories: HashMap<String, RawCategory>,
    pub audits: HashMap<String, RawAudit>,
    pub fetch_time: Option<String>,
    pub lighthouse_version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCategory {
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAudit {
    pub title: String,
    pub description: String,
    pub score: Option<f64>,
    pub score_display_mode: String,
    pub display_value: String,
    pub numeric_value: Option<f64>,
    pub details: Option<Value>,
}

/// Field data; unlike the Lighthouse result its keys are snake case on the wire
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLoadingExperience {
    pub metrics: HashMap<String, RawFieldMetric>,
    pub overall_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFieldMetric {
    pub percentile: Option<f64>,
    pub category: Option<String>,
    pub distributions: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_tiers() {
        assert_eq!(Impact::classify(1200.0, 0.0), Impact::High);
        assert_eq!(Impact::classify(0.0, 101.0), Impact::High);
        assert_eq!(Impact::classify(1000.0, 0.0), Impact::Medium);
        assert_eq!(Impact::classify(300.0, 0.0), Impact::Low);
        assert_eq!(Impact::classify(0.0, 10.5), Impact::Low);
        assert_eq!(Impact::classify(100.0, 10.0), Impact::Minimal);
    }

    #[test]
    fn test_impact_is_monotonic_in_time_savings() {
        let mut previous = Impact::Minimal;
        for ms in (0..3000).step_by(25) {
            let impact = Impact::classify(ms as f64, 0.0);
            assert!(impact >= previous, "{} ms dropped to {}", ms, impact);
            previous = impact;
        }
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Mobile".parse::<Strategy>().unwrap(), Strategy::Mobile);
        assert_eq!("desktop".parse::<Strategy>().unwrap(), Strategy::Desktop);
        assert!("tablet".parse::<Strategy>().is_err());
        assert_eq!(serde_json::to_string(&Impact::High).unwrap(), "\"HIGH\"");
    }
}
