//! # site-audit - Website Audit and Page-Builder Prompt Generation
//!
//! This crate audits a website and condenses the findings into a prompt for AI page
//! builders. It crawls a bounded number of pages and extracts their structure. It also
//! measures the site with PageSpeed Insights, asks an LLM for brand and strategy
//! insights, and renders everything into a report and a prompt.
//!
//! ## Features
//!
//! - Polite, bounded crawling with page-type aware link selection
//! - Structural extraction: headings, sections, images, links, meta tags, structured data
//! - Stylesheet color and font sniffing
//! - Rule-based SEO scoring
//! - AI insight extraction with tolerant JSON repair and per-category defaults
//! - PageSpeed Insights normalization with ranked opportunities
//! - Deterministic prompt synthesis and JSON reports
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use site_audit::crawler::{CrawlerConfig, crawl_website};
//! use site_audit::insights::AIInsightSet;
//! use site_audit::prompt::synthesize;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::builder().max_pages(5).build();
//!     let site = crawl_website("https://example.com", config).await?;
//!
//!     let prompt = synthesize(&site.base_url, None, &site, &AIInsightSet::default());
//!     println!("{}", prompt);
//!     Ok(())
//! }
//! ```

mod error;
pub mod http;
pub mod markdown;
pub mod model;

pub mod crawler;
pub mod insights;
pub mod pagespeed;
pub mod prompt;
pub mod report;
pub mod seo;
pub mod style;

pub use error::{Error, Outcome, Result};
