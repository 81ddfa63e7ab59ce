//! Frontier selection: which pages of a site are worth visiting after the root page
//!
//! Only navigation-like containers and the footer are scanned. A link qualifies when it
//! stays on the root page's host and its path or text names a well-known page kind.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::crawler::content_extraction::{element_text, resolve_href, selector};
use crate::crawler::error::CrawlError;

/// Keywords that mark a navigation link as a crawl target
const NAV_KEYWORDS: [&str; 11] = [
    "about", "contact", "services", "products", "home", "team", "careers", "blog", "news",
    "pricing", "features",
];

/// Extra keywords accepted only inside the footer
const FOOTER_KEYWORDS: [&str; 2] = ["privacy", "terms"];

static NAV_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)nav|menu").expect("valid regex"));

struct Frontier<'a> {
    base: &'a Url,
    seen: HashSet<String>,
    targets: Vec<String>,
}

impl<'a> Frontier<'a> {
    fn new(base: &'a Url) -> Self {
        Self {
            base,
            seen: HashSet::new(),
            targets: Vec::new(),
        }
    }

    fn is_base(&self, url: &Url) -> bool {
        url.as_str().trim_end_matches('/') == self.base.as_str().trim_end_matches('/')
    }

    fn scan(&mut self, container: ElementRef<'_>, keywords: &[&str]) -> Result<(), CrawlError> {
        for anchor in container.select(&selector("a[href]")?) {
            let href = anchor.value().attr("href").unwrap_or_default();
            let Some(url) = resolve_href(self.base, href) else {
                continue;
            };
            if url.host_str() != self.base.host_str() || self.is_base(&url) {
                continue;
            }

            let path = url.path().to_lowercase();
            let text = element_text(anchor).to_lowercase();
            let matches = keywords
                .iter()
                .any(|keyword| path.contains(keyword) || text.contains(keyword));
            if matches && self.seen.insert(url.to_string()) {
                self.targets.push(url.to_string());
            }
        }
        Ok(())
    }
}

/// Select follow-up crawl targets from the root page's navigation and footer
///
/// # Arguments
///
/// * `base` - URL of the root page
/// * `document` - Parsed root page
///
/// # Returns
///
/// Absolute, fragment-free, deduplicated URLs in order of discovery. The root page
/// itself is never included.
pub fn select_targets(base: &Url, document: &Html) -> Result<Vec<String>, CrawlError> {
    let mut frontier = Frontier::new(base);

    for container in document.select(&selector("nav, ul[class], div[class]")?) {
        let is_navigation = container.value().name() == "nav"
            || container
                .value()
                .attr("class")
                .is_some_and(|class| NAV_CLASS.is_match(class));
        if is_navigation {
            frontier.scan(container, &NAV_KEYWORDS)?;
        }
    }

    let footer_keywords: Vec<&str> = NAV_KEYWORDS.iter().chain(&FOOTER_KEYWORDS).copied().collect();
    for footer in document.select(&selector("footer")?) {
        frontier.scan(footer, &footer_keywords)?;
    }

    Ok(frontier.targets)
}
