//! Mapping of raw Lighthouse results onto [`PerformanceDocument`]

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::pagespeed::types::{
    AuditSummary, FieldMetric, Impact, LoadingExperience, Opportunity, PerformanceDocument,
    PerformanceMetric, RawAudit, RawLoadingExperience, RawResponse, RealUserMetric,
    ResourceSummary, Strategy, VitalMetric,
};

/// Audit id to vital key
const CORE_VITALS: [(&str, &str); 6] = [
    ("largest-contentful-paint", "largest_contentful_paint"),
    ("first-input-delay", "first_input_delay"),
    ("cumulative-layout-shift", "cumulative_layout_shift"),
    ("first-contentful-paint", "first_contentful_paint"),
    ("time-to-interactive", "time_to_interactive"),
    ("speed-index", "speed_index"),
];

/// Vitals reported in milliseconds and normalized to seconds
const MILLISECOND_VITALS: [&str; 3] = [
    "largest-contentful-paint",
    "first-contentful-paint",
    "time-to-interactive",
];

const PERFORMANCE_AUDITS: [&str; 7] = [
    "first-contentful-paint",
    "largest-contentful-paint",
    "first-meaningful-paint",
    "speed-index",
    "time-to-interactive",
    "max-potential-fid",
    "cumulative-layout-shift",
];

const OPPORTUNITY_AUDITS: [&str; 12] = [
    "render-blocking-resources",
    "unused-css-rules",
    "unused-javascript",
    "modern-image-formats",
    "offscreen-images",
    "minify-css",
    "minify-javascript",
    "enable-text-compression",
    "properly-size-images",
    "efficient-animated-content",
    "preload-lcp-image",
    "uses-optimized-images",
];

const DIAGNOSTIC_AUDITS: [&str; 9] = [
    "mainthread-work-breakdown",
    "bootup-time",
    "uses-rel-preconnect",
    "font-display",
    "third-party-summary",
    "largest-contentful-paint-element",
    "avoid-enormous-network-payloads",
    "uses-long-cache-ttl",
    "total-byte-weight",
];

const SEO_AUDITS: [&str; 11] = [
    "document-title",
    "meta-description",
    "http-status-code",
    "link-text",
    "crawlable-anchors",
    "is-crawlable",
    "robots-txt",
    "image-alt",
    "hreflang",
    "canonical",
    "structured-data",
];

const ACCESSIBILITY_AUDITS: [&str; 9] = [
    "color-contrast",
    "image-alt",
    "label",
    "link-name",
    "list",
    "meta-viewport",
    "heading-order",
    "html-has-lang",
    "valid-lang",
];

const MAX_OPPORTUNITY_ITEMS: usize = 5;
const UNKNOWN_CATEGORY: &str = "UNKNOWN";

fn detail_number(details: Option<&Value>, key: &str) -> f64 {
    details
        .and_then(|d| d.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn detail_items(details: Option<&Value>) -> &[Value] {
    details
        .and_then(|d| d.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn core_web_vitals(audits: &HashMap<String, RawAudit>) -> BTreeMap<String, VitalMetric> {
    CORE_VITALS
        .iter()
        .filter_map(|(audit_id, key)| {
            let audit = audits.get(*audit_id)?;
            let raw = audit.numeric_value.unwrap_or(0.0);
            let value = if MILLISECOND_VITALS.contains(audit_id) {
                raw / 1000.0
            } else {
                raw
            };
            Some((
                key.to_string(),
                VitalMetric {
                    value,
                    score: audit.score.unwrap_or(0.0),
                    display_value: audit.display_value.clone(),
                    description: audit.description.clone(),
                },
            ))
        })
        .collect()
}

fn real_user_vitals(experience: Option<&RawLoadingExperience>) -> BTreeMap<String, RealUserMetric> {
    let mut vitals = BTreeMap::new();
    let Some(experience) = experience else {
        return vitals;
    };

    for (name, metric) in &experience.metrics {
        let category = metric
            .category
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
        let percentile = metric.percentile.unwrap_or(0.0);
        match name.as_str() {
            "FIRST_CONTENTFUL_PAINT_MS" => {
                vitals.insert(
                    "fcp_real_user".to_string(),
                    RealUserMetric {
                        percentile: percentile / 1000.0,
                        category,
                    },
                );
            }
            "FIRST_INPUT_DELAY_MS" => {
                vitals.insert(
                    "fid_real_user".to_string(),
                    RealUserMetric {
                        percentile,
                        category,
                    },
                );
            }
            _ => {}
        }
    }
    vitals
}

fn performance_metrics(audits: &HashMap<String, RawAudit>) -> BTreeMap<String, PerformanceMetric> {
    PERFORMANCE_AUDITS
        .iter()
        .filter_map(|audit_id| {
            let audit = audits.get(*audit_id)?;
            Some((
                audit_id.replace('-', "_"),
                PerformanceMetric {
                    value: audit.numeric_value.unwrap_or(0.0),
                    score: audit.score.unwrap_or(0.0),
                    display_value: audit.display_value.clone(),
                    title: audit.title.clone(),
                    description: audit.description.clone(),
                },
            ))
        })
        .collect()
}

/// Failed opportunity audits, highest impact first
///
/// Audits without a score are treated as passed. Ties keep the audit list order.
fn opportunities(audits: &HashMap<String, RawAudit>) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = OPPORTUNITY_AUDITS
        .iter()
        .filter_map(|audit_id| {
            let audit = audits.get(*audit_id)?;
            let score = audit.score.unwrap_or(1.0);
            if score >= 1.0 {
                return None;
            }

            let details = audit.details.as_ref();
            let savings_ms = detail_number(details, "overallSavingsMs");
            let savings_kb = detail_number(details, "overallSavingsBytes") / 1024.0;
            Some(Opportunity {
                id: audit_id.to_string(),
                title: audit.title.clone(),
                description: audit.description.clone(),
                score,
                display_value: audit.display_value.clone(),
                savings_ms,
                savings_kb,
                impact: Impact::classify(savings_ms, savings_kb),
                items: detail_items(details)
                    .iter()
                    .take(MAX_OPPORTUNITY_ITEMS)
                    .cloned()
                    .collect(),
            })
        })
        .collect();

    opportunities.sort_by(|a, b| b.impact.cmp(&a.impact));
    opportunities
}

fn audit_summaries(audits: &HashMap<String, RawAudit>, ids: &[&str]) -> Vec<AuditSummary> {
    ids.iter()
        .filter_map(|audit_id| {
            let audit = audits.get(*audit_id)?;
            Some(AuditSummary {
                id: audit_id.to_string(),
                title: audit.title.clone(),
                description: audit.description.clone(),
                score: audit.score,
                score_display_mode: audit.score_display_mode.clone(),
                display_value: audit.display_value.clone(),
                details: audit.details.clone().unwrap_or(Value::Null),
            })
        })
        .collect()
}

fn loading_experience(experience: Option<&RawLoadingExperience>) -> Option<LoadingExperience> {
    let experience = experience?;
    if experience.metrics.is_empty() && experience.overall_category.is_none() {
        return None;
    }

    let metrics = experience
        .metrics
        .iter()
        .map(|(name, metric)| {
            (
                name.to_lowercase(),
                FieldMetric {
                    percentile: metric.percentile.unwrap_or(0.0),
                    category: metric
                        .category
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
                    distributions: metric.distributions.clone(),
                },
            )
        })
        .collect();

    Some(LoadingExperience {
        overall_category: experience
            .overall_category
            .clone()
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        metrics,
    })
}

fn resource_summary(audits: &HashMap<String, RawAudit>) -> ResourceSummary {
    let mut summary = ResourceSummary {
        total_byte_weight: audits
            .get("total-byte-weight")
            .and_then(|audit| audit.numeric_value)
            .unwrap_or(0.0),
        ..Default::default()
    };

    if let Some(network) = audits.get("network-requests") {
        let items = detail_items(network.details.as_ref());
        for item in items {
            let resource_type = item
                .get("resourceType")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase();
            match resource_type.as_str() {
                "image" => summary.image_count += 1,
                "script" => summary.script_count += 1,
                "stylesheet" => summary.stylesheet_count += 1,
                "font" => summary.font_count += 1,
                _ => {}
            }
        }
        summary.total_requests = items.len();
    }

    summary
}

/// Normalize a raw API response
///
/// # Arguments
///
/// * `raw` - Decoded API response
/// * `url` - URL that was measured
/// * `strategy` - Device profile of the run
/// * `api_key_used` - Whether the request carried an API key
pub fn normalize(
    raw: &RawResponse,
    url: &str,
    strategy: Strategy,
    api_key_used: bool,
) -> PerformanceDocument {
    let lighthouse = &raw.lighthouse_result;
    let audits = &lighthouse.audits;
    let category_score = |name: &str| {
        lighthouse
            .categories
            .get(name)
            .and_then(|category| category.score)
            .unwrap_or(0.0)
    };

    PerformanceDocument {
        url: url.to_string(),
        strategy,
        fetch_time: lighthouse.fetch_time.clone(),
        lighthouse_version: lighthouse.lighthouse_version.clone(),
        performance_score: category_score("performance"),
        accessibility_score: category_score("accessibility"),
        best_practices_score: category_score("best-practices"),
        seo_score: category_score("seo"),
        core_web_vitals: core_web_vitals(audits),
        real_user_vitals: real_user_vitals(raw.loading_experience.as_ref()),
        performance_metrics: performance_metrics(audits),
        opportunities: opportunities(audits),
        diagnostics: audit_summaries(audits, &DIAGNOSTIC_AUDITS),
        seo_audits: audit_summaries(audits, &SEO_AUDITS),
        accessibility_audits: audit_summaries(audits, &ACCESSIBILITY_AUDITS),
        loading_experience: loading_experience(raw.loading_experience.as_ref()),
        resource_summary: resource_summary(audits),
        api_key_used,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// A trimmed but realistic PageSpeed response
    pub(crate) fn sample_response() -> Value {
        json!({
            "lighthouseResult": {
                "fetchTime": "2024-05-01T10:00:00.000Z",
                "lighthouseVersion": "12.0.0",
                "categories": {
                    "performance": {"score": 0.42},
                    "accessibility": {"score": 0.9},
                    "best-practices": {"score": 0.75},
                    "seo": {"score": 1.0}
                },
                "audits": {
                    "largest-contentful-paint": {
                        "numericValue": 5000.0,
                        "score": 0.1,
                        "displayValue": "5.0 s",
                        "title": "Largest Contentful Paint",
                        "description": "LCP"
                    },
                    "cumulative-layout-shift": {"numericValue": 0.25, "score": 0.4, "displayValue": "0.25"},
                    "first-contentful-paint": {"numericValue": 1800.0, "score": 0.8},
                    "unused-javascript": {
                        "score": 0.3,
                        "title": "Reduce unused JavaScript",
                        "details": {
                            "overallSavingsMs": 300,
                            "overallSavingsBytes": 2048,
                            "items": [{"url": "a.js"}, {"url": "b.js"}, {"url": "c.js"},
                                      {"url": "d.js"}, {"url": "e.js"}, {"url": "f.js"}]
                        }
                    },
                    "render-blocking-resources": {
                        "score": 0.0,
                        "title": "Eliminate render-blocking resources",
                        "details": {"overallSavingsMs": 1200}
                    },
                    "minify-css": {"score": 1.0, "details": {"overallSavingsMs": 5000}},
                    "offscreen-images": {"score": null, "details": {"overallSavingsMs": 5000}},
                    "document-title": {"score": 1.0, "scoreDisplayMode": "binary", "title": "Has title"},
                    "image-alt": {"score": 0.0, "scoreDisplayMode": "binary"},
                    "total-byte-weight": {"numericValue": 123456.0, "score": 0.9},
                    "network-requests": {
                        "details": {"items": [
                            {"resourceType": "Document"},
                            {"resourceType": "Image"},
                            {"resourceType": "Image"},
                            {"resourceType": "Script"},
                            {"resourceType": "Stylesheet"},
                            {"resourceType": "Font"}
                        ]}
                    }
                }
            },
            "loadingExperience": {
                "overall_category": "AVERAGE",
                "metrics": {
                    "FIRST_CONTENTFUL_PAINT_MS": {"percentile": 2100, "category": "AVERAGE", "distributions": []},
                    "FIRST_INPUT_DELAY_MS": {"percentile": 40, "category": "FAST"}
                }
            }
        })
    }

    fn sample_document() -> PerformanceDocument {
        let raw: RawResponse = serde_json::from_value(sample_response()).unwrap();
        normalize(&raw, "https://acme.test", Strategy::Mobile, false)
    }

    #[test]
    fn test_category_scores() {
        let document = sample_document();
        assert_eq!(document.performance_score, 0.42);
        assert_eq!(document.accessibility_score, 0.9);
        assert_eq!(document.best_practices_score, 0.75);
        assert_eq!(document.seo_score, 1.0);
        assert_eq!(document.lighthouse_version.as_deref(), Some("12.0.0"));
        assert!(!document.api_key_used);
    }

    #[test]
    fn test_lcp_is_converted_to_seconds() {
        let document = sample_document();
        let lcp = document.vital("largest_contentful_paint").unwrap();
        assert_eq!(lcp.value, 5.0);
        assert_eq!(lcp.display_value, "5.0 s");
        assert_eq!(document.vital("first_contentful_paint").unwrap().value, 1.8);
        assert_eq!(document.vital("cumulative_layout_shift").unwrap().value, 0.25);
        assert!(document.vital("speed_index").is_none());
        assert_eq!(
            document.performance_metrics["largest_contentful_paint"].value,
            5000.0
        );
    }

    #[test]
    fn test_opportunities_sorted_by_impact() {
        let document = sample_document();
        let ids: Vec<&str> = document
            .opportunities
            .iter()
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(ids, vec!["render-blocking-resources", "unused-javascript"]);

        let first = &document.opportunities[0];
        assert_eq!(first.savings_ms, 1200.0);
        assert_eq!(first.impact, Impact::High);

        let second = &document.opportunities[1];
        assert_eq!(second.savings_ms, 300.0);
        assert_eq!(second.savings_kb, 2.0);
        assert_eq!(second.impact, Impact::Low);
        assert_eq!(second.items.len(), 5);
    }

    #[test]
    fn test_audit_lists_and_resources() {
        let document = sample_document();
        assert_eq!(document.diagnostics.len(), 1);
        assert_eq!(document.diagnostics[0].id, "total-byte-weight");
        let seo_ids: Vec<&str> = document.seo_audits.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(seo_ids, vec!["document-title", "image-alt"]);
        assert_eq!(document.accessibility_audits.len(), 1);
        assert_eq!(document.accessibility_audits[0].score, Some(0.0));

        let resources = &document.resource_summary;
        assert_eq!(resources.total_byte_weight, 123456.0);
        assert_eq!(resources.image_count, 2);
        assert_eq!(resources.script_count, 1);
        assert_eq!(resources.stylesheet_count, 1);
        assert_eq!(resources.font_count, 1);
        assert_eq!(resources.total_requests, 6);
    }

    #[test]
    fn test_loading_experience() {
        let document = sample_document();
        let experience = document.loading_experience.as_ref().unwrap();
        assert_eq!(experience.overall_category, "AVERAGE");
        assert_eq!(
            experience.metrics["first_input_delay_ms"].category,
            "FAST"
        );
        assert_eq!(document.real_user_vitals["fcp_real_user"].percentile, 2.1);
        assert_eq!(document.real_user_vitals["fid_real_user"].percentile, 40.0);
    }

    #[test]
    fn test_empty_response() {
        let document = normalize(&RawResponse::default(), "https://acme.test", Strategy::Desktop, true);
        assert_eq!(document.performance_score, 0.0);
        assert!(document.core_web_vitals.is_empty());
        assert!(document.opportunities.is_empty());
        assert!(document.loading_experience.is_none());
        assert_eq!(document.resource_summary, ResourceSummary::default());
        assert!(document.api_key_used);
    }
}
