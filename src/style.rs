//! # Style Sniffer
//!
//! Approximate visual identity of a site, read from the first stylesheet linked by the
//! root page. Colors and font families are pulled from the raw CSS with a fixed set of
//! regular expressions; nothing is parsed as a stylesheet.
//!
//! A missing or unreachable stylesheet never fails the audit: [`StyleSniffer::sniff`]
//! returns empty lists wrapped in [`Outcome::Recovered`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::crawler::PageRecord;
use crate::error::Outcome;
use crate::http::Fetcher;

const MAX_COLORS: usize = 10;
const MAX_FONTS: usize = 5;

const NAMED_COLORS: [&str; 12] = [
    "white", "black", "red", "blue", "green", "yellow", "purple", "orange", "pink", "brown",
    "gray", "grey",
];

const FALLBACK_FONTS: [&str; 11] = [
    "arial",
    "helvetica",
    "sans-serif",
    "serif",
    "monospace",
    "times",
    "times new roman",
    "georgia",
    "verdana",
    "tahoma",
    "trebuchet ms",
];

const CSS_WIDE_KEYWORDS: [&str; 4] = ["inherit", "initial", "unset", "revert"];

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#[0-9a-fA-F]{6}\b|#[0-9a-fA-F]{3}\b").expect("valid regex")
});
static RGB_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)rgba?\([^)]+\)").expect("valid regex"));
static COLOR_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\w-])(?:background-|border-)?color\s*:\s*([^;}]+)")
        .expect("valid regex")
});
static FONT_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)font-family\s*:\s*([^;}]+)").expect("valid regex"));
static FONT_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s;{])font\s*:\s*([^;}]+)").expect("valid regex")
});
static IMPORT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)@import\s+(?:url\()?\s*['"]?([^'")\s]+)"#).expect("valid regex")
});
static FAMILY_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"family=([^&]+)").expect("valid regex"));

/// Colors and fonts found in a site's primary stylesheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSummary {
    /// Stylesheet that was analyzed, if the page linked one
    pub stylesheet_url: Option<String>,
    /// Up to 10 distinct color tokens in order of appearance
    pub colors: Vec<String>,
    /// Up to 5 distinct non-generic font families in order of appearance
    pub fonts: Vec<String>,
    /// Size of the stylesheet in bytes
    pub total_css_size: usize,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        values.push(value.to_string());
    }
}

fn push_font(fonts: &mut Vec<String>, raw: &str) {
    let name = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let lowered = name.to_lowercase();
    if name.is_empty()
        || lowered.starts_with("var(")
        || FALLBACK_FONTS.contains(&lowered.as_str())
        || CSS_WIDE_KEYWORDS.contains(&lowered.as_str())
    {
        return;
    }
    push_unique(fonts, name);
}

/// Family part of a `font:` shorthand: everything after the size token
fn shorthand_families(value: &str) -> Vec<String> {
    let mut segments = value.split(',');
    let first = segments.next().unwrap_or_default();
    let tokens: Vec<&str> = first.split_whitespace().collect();
    let start = tokens
        .iter()
        .rposition(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map_or(0, |i| i + 1);

    let mut families = vec![tokens[start..].join(" ")];
    families.extend(segments.map(str::to_string));
    families
}

/// Scan raw CSS for color and font tokens
///
/// # Returns
///
/// `(colors, fonts)`, each deduplicated case-insensitively in first-seen order and capped
/// at 10 colors and 5 fonts
pub fn scan_css(css: &str) -> (Vec<String>, Vec<String>) {
    let mut colors = Vec::new();
    for m in HEX_COLOR.find_iter(css) {
        push_unique(&mut colors, m.as_str());
    }
    for m in RGB_COLOR.find_iter(css) {
        push_unique(&mut colors, m.as_str());
    }
    for captures in COLOR_PROPERTY.captures_iter(css) {
        for token in captures[1].split_whitespace() {
            let token = token.to_lowercase();
            if NAMED_COLORS.contains(&token.as_str()) {
                push_unique(&mut colors, &token);
            }
        }
    }
    colors.truncate(MAX_COLORS);

    let mut fonts = Vec::new();
    for captures in FONT_FAMILY.captures_iter(css) {
        for family in captures[1].split(',') {
            push_font(&mut fonts, family);
        }
    }
    for captures in FONT_SHORTHAND.captures_iter(css) {
        for family in shorthand_families(&captures[1]) {
            push_font(&mut fonts, &family);
        }
    }
    for captures in IMPORT_URL.captures_iter(css) {
        let import = &captures[1];
        if !import.to_lowercase().contains("googleapis") {
            continue;
        }
        for family in FAMILY_PARAM.captures_iter(import) {
            for name in family[1].split('|') {
                let name = name.split(':').next().unwrap_or_default().replace('+', " ");
                push_font(&mut fonts, &name);
            }
        }
    }
    fonts.truncate(MAX_FONTS);

    (colors, fonts)
}

/// Fetches and scans the primary stylesheet of a page
#[derive(Debug, Clone)]
pub struct StyleSniffer {
    fetcher: Fetcher,
}

impl StyleSniffer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Sniff the colors and fonts of the first stylesheet linked by `page`
    #[instrument(skip(self, page), fields(url = %page.url))]
    pub async fn sniff(&self, page: &PageRecord) -> Outcome<StyleSummary> {
        let Some(stylesheet_url) = page.stylesheets.first() else {
            debug!("No stylesheet linked from {}", page.url);
            return Outcome::Complete(StyleSummary::default());
        };

        match self.fetcher.fetch(stylesheet_url).await {
            Ok(css) => {
                let (colors, fonts) = scan_css(&css);
                debug!(
                    "Stylesheet {}: {} colors, {} fonts",
                    stylesheet_url,
                    colors.len(),
                    fonts.len()
                );
                Outcome::Complete(StyleSummary {
                    stylesheet_url: Some(stylesheet_url.clone()),
                    colors,
                    fonts,
                    total_css_size: css.len(),
                })
            }
            Err(e) => {
                warn!("Style analysis of {} failed: {}", stylesheet_url, e);
                Outcome::recovered(
                    StyleSummary {
                        stylesheet_url: Some(stylesheet_url.clone()),
                        ..Default::default()
                    },
                    e,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const CSS: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Open+Sans:wght@400;700&family=Lora&display=swap');
body { font-family: "Open Sans", Arial, sans-serif; color: #333; background-color: white; }
h1 { font: italic bold 2rem/1.2 Montserrat, serif; color: #FF5733; }
a { color: rgba(0, 0, 0, 0.5); border-color: Blue !important; }
.x { color: #333333; background: #333; font-family: inherit; }
"#;

    #[test]
    fn test_scan_css_colors() {
        let (colors, _) = scan_css(CSS);
        assert_eq!(
            colors,
            vec!["#333", "#FF5733", "#333333", "rgba(0, 0, 0, 0.5)", "white", "blue"]
        );
    }

    #[test]
    fn test_scan_css_fonts() {
        let (_, fonts) = scan_css(CSS);
        assert_eq!(fonts, vec!["Open Sans", "Montserrat", "Lora"]);
    }

    #[test]
    fn test_scan_css_caps_results() {
        let css: String = (0..20)
            .map(|i| format!(".c{i} {{ color: #{i:03}; font-family: Family{i}; }}\n"))
            .collect();
        let (colors, fonts) = scan_css(&css);
        assert_eq!(colors.len(), MAX_COLORS);
        assert_eq!(fonts.len(), MAX_FONTS);
        assert_eq!(fonts[0], "Family0");
    }

    fn page_with_stylesheet(url: Option<String>) -> PageRecord {
        PageRecord {
            url: "https://acme.test/".to_string(),
            stylesheets: url.into_iter().collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sniff_fetches_first_stylesheet() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/site.css")
            .with_status(200)
            .with_header("content-type", "text/css")
            .with_body(CSS)
            .expect(1)
            .create_async()
            .await;

        let sniffer = StyleSniffer::new(Fetcher::new().unwrap());
        let css_url = format!("{}/site.css", server.url());
        let outcome = sniffer
            .sniff(&page_with_stylesheet(Some(css_url.clone())))
            .await;

        assert!(!outcome.is_recovered());
        let summary = outcome.into_value();
        assert_eq!(summary.stylesheet_url, Some(css_url));
        assert_eq!(summary.total_css_size, CSS.len());
        assert_eq!(summary.fonts[0], "Open Sans");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sniff_recovers_from_fetch_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.css")
            .with_status(404)
            .create_async()
            .await;

        let sniffer = StyleSniffer::new(Fetcher::new().unwrap());
        let outcome = sniffer
            .sniff(&page_with_stylesheet(Some(format!(
                "{}/missing.css",
                server.url()
            ))))
            .await;

        assert!(outcome.is_recovered());
        let summary = outcome.value();
        assert!(summary.colors.is_empty());
        assert!(summary.fonts.is_empty());
        assert_eq!(summary.total_css_size, 0);
    }

    #[tokio::test]
    async fn test_sniff_without_stylesheet() {
        let sniffer = StyleSniffer::new(Fetcher::new().unwrap());
        let outcome = sniffer.sniff(&page_with_stylesheet(None)).await;
        assert_eq!(outcome, Outcome::Complete(StyleSummary::default()));
    }
}
