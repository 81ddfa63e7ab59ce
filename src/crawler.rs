//! # Website Crawler Module
//!
//! This module crawls a small, bounded set of pages from one site and turns them into
//! structured records. It is the first stage of an audit: everything downstream (style
//! sniffing, SEO scoring, AI insights, prompt synthesis) consumes the [`SiteDocument`]
//! produced here.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Page budget, pacing and client identity for a crawl
//! - `Crawler` / `crawl_website`: Fetch the root page, pick follow-up pages, aggregate
//! - `extract`: Structural extraction of one HTML document into a [`PageRecord`]
//! - `select_targets`: Frontier selection from navigation and footer links
//! - `SiteDocument`: Aggregated view over all successfully parsed pages
//!
//! ## Features
//!
//! - Boilerplate (script/style/nav/footer/header) separated from body text
//! - Headings, images, links, meta tags and structured data (JSON-LD, microdata)
//! - Page-type classification from URL path and title
//! - Fixed inter-request delay; root failure is fatal, other page failures are skipped
//! - Distinct-URL link counts and keyword themes across the whole site

mod aggregate;
mod config;
mod content_extraction;
mod error;
mod frontier;
mod orchestrator;

pub use aggregate::build_site_document;
pub use config::{CrawlerConfig, CrawlerConfigBuilder};
pub use content_extraction::{classify_page_type, extract, extract_document};
pub use error::CrawlError;
pub use frontier::select_targets;
pub use orchestrator::{Crawler, crawl_website, normalize_base_url};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Headings of a page, grouped by level in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Headings of one level (1..=6); other levels are empty
    pub fn level(&self, level: usize) -> &[String] {
        match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            6 => &self.h6,
            _ => &[],
        }
    }

    fn level_mut(&mut self, level: usize) -> Option<&mut Vec<String>> {
        match level {
            1 => Some(&mut self.h1),
            2 => Some(&mut self.h2),
            3 => Some(&mut self.h3),
            4 => Some(&mut self.h4),
            5 => Some(&mut self.h5),
            6 => Some(&mut self.h6),
            _ => None,
        }
    }

    /// Append a heading to a level; levels outside 1..=6 are ignored
    pub fn push(&mut self, level: usize, text: String) {
        if let Some(headings) = self.level_mut(level) {
            headings.push(text);
        }
    }

    /// Append every heading of `other`, level by level
    pub fn extend_from(&mut self, other: &Headings) {
        for level in 1..=6 {
            if let Some(headings) = self.level_mut(level) {
                headings.extend(other.level(level).iter().cloned());
            }
        }
    }

    /// All headings, level 1 first
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        (1..=6).flat_map(move |level| self.level(level).iter())
    }

    /// Total number of headings across all levels
    pub fn len(&self) -> usize {
        (1..=6).map(|level| self.level(level).len()).sum()
    }

    /// Whether the page has no headings at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A content section paired with its first inner heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Section text, truncated to 500 characters
    pub content: String,
}

/// An `<img>` found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Absolute source URL
    pub src: String,
    pub alt: String,
    pub title: String,
    pub width: String,
    pub height: String,
    pub loading: String,
    /// Whether the trimmed alt text is non-empty
    pub has_alt: bool,
}

/// An `<a href>` found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute URL without fragment
    pub url: String,
    pub text: String,
    pub title: String,
    pub rel: Vec<String>,
    pub target: String,
}

/// Links of a page split by host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub internal: Vec<LinkRecord>,
    pub external: Vec<LinkRecord>,
}

/// A microdata item marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Microdata {
    pub itemtype: String,
    pub itemscope: bool,
}

/// Machine-readable metadata embedded in a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "kebab-case")]
pub enum StructuredData {
    /// Parsed body of a `script[type=application/ld+json]`
    JsonLd(serde_json::Value),
    /// Element carrying an `itemtype` attribute
    Microdata(Microdata),
}

/// Coarse classification of a page's purpose
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    Home,
    About,
    Contact,
    Services,
    Products,
    Team,
    Careers,
    Blog,
    News,
    Pricing,
    Features,
    Product,
    Other,
    #[default]
    Unknown,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Home => "home",
            PageType::About => "about",
            PageType::Contact => "contact",
            PageType::Services => "services",
            PageType::Products => "products",
            PageType::Team => "team",
            PageType::Careers => "careers",
            PageType::Blog => "blog",
            PageType::News => "news",
            PageType::Pricing => "pricing",
            PageType::Features => "features",
            PageType::Product => "product",
            PageType::Other => "other",
            PageType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched and parsed page
///
/// Records are immutable once produced and contain nothing time- or order-dependent
/// beyond the document itself, so extracting the same bytes twice yields equal records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Absolute URL of the page
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub headings: Headings,
    /// Whitespace-collapsed text of the main content candidate
    pub body_text: String,
    /// Paragraph texts longer than 20 characters
    pub paragraphs: Vec<String>,
    pub sections: Vec<Section>,
    pub images: Vec<ImageRecord>,
    pub links: Links,
    /// Meta tags keyed by lower-cased name/property/http-equiv
    pub meta_tags: BTreeMap<String, String>,
    pub structured_data: Vec<StructuredData>,
    /// Absolute hrefs of `link[rel=stylesheet]` in document order
    pub stylesheets: Vec<String>,
    /// `\b\w+\b` tokens of the boilerplate-stripped document
    pub word_count: usize,
    pub page_type: PageType,
}

/// Keyword summary derived from all pages of a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentThemes {
    pub top_keywords: Vec<String>,
    pub total_unique_words: usize,
    pub avg_words_per_page: f64,
    pub heading_keywords: Vec<String>,
}

/// Aggregation of every successfully parsed page of one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteDocument {
    pub base_url: String,
    pub pages_analyzed: usize,
    pub pages: Vec<PageRecord>,
    pub total_word_count: usize,
    pub all_headings: Headings,
    pub image_count: usize,
    pub images_without_alt: usize,
    /// Number of distinct internal link URLs
    pub internal_links_count: usize,
    /// Number of distinct external link URLs
    pub external_links_count: usize,
    pub meta_tags: BTreeMap<String, String>,
    pub structured_data: Vec<StructuredData>,
    pub page_types_found: Vec<PageType>,
    pub content_themes: ContentThemes,
    pub detailed_images: Vec<ImageRecord>,
    pub sample_internal_links: Vec<LinkRecord>,
    pub sample_external_links: Vec<LinkRecord>,
}

impl SiteDocument {
    /// The page treated as the home page: first typed "home", else the first page
    pub fn home_page(&self) -> Option<&PageRecord> {
        self.pages
            .iter()
            .find(|page| page.page_type == PageType::Home)
            .or_else(|| self.pages.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_levels() {
        let mut headings = Headings::default();
        headings.push(1, "Welcome".to_string());
        headings.push(3, "Details".to_string());
        headings.push(7, "Ignored".to_string());

        assert_eq!(headings.level(1), ["Welcome".to_string()]);
        assert_eq!(headings.level(3), ["Details".to_string()]);
        assert!(headings.level(7).is_empty());
        assert_eq!(headings.len(), 2);

        let mut merged = Headings::default();
        merged.extend_from(&headings);
        merged.extend_from(&headings);
        assert_eq!(merged.h1.len(), 2);
        assert_eq!(merged.iter().next().map(String::as_str), Some("Welcome"));
    }

    #[test]
    fn test_structured_data_serialization() {
        let json_ld = StructuredData::JsonLd(serde_json::json!({"@type": "Organization"}));
        let value = serde_json::to_value(&json_ld).unwrap();
        assert_eq!(value["kind"], "json-ld");
        assert_eq!(value["payload"]["@type"], "Organization");

        let microdata = StructuredData::Microdata(Microdata {
            itemtype: "https://schema.org/Product".to_string(),
            itemscope: true,
        });
        let value = serde_json::to_value(&microdata).unwrap();
        assert_eq!(value["kind"], "microdata");
        assert_eq!(value["payload"]["itemscope"], true);
    }

    #[test]
    fn test_page_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PageType::Pricing).unwrap(), "\"pricing\"");
        assert_eq!(PageType::default(), PageType::Unknown);
        assert_eq!(PageType::Blog.to_string(), "blog");
    }
}
