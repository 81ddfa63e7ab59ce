//! Structural extraction of a single HTML document into a [`PageRecord`]
//!
//! Title, meta tags, headings, images, links, structured data and stylesheets are read
//! from the full document. Body text, paragraphs, sections and the word count are read
//! from a copy with `script`, `style`, `nav`, `footer` and `header` subtrees detached.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::crawler::error::CrawlError;
use crate::crawler::{
    Headings, ImageRecord, LinkRecord, Links, Microdata, PageRecord, PageType, Section,
    StructuredData,
};

/// Elements treated as boilerplate rather than content
const BOILERPLATE_SELECTOR: &str = "script, style, nav, footer, header";

const MIN_PARAGRAPH_CHARS: usize = 20;
const MIN_SECTION_CHARS: usize = 50;
const SECTION_PREVIEW_CHARS: usize = 500;

/// Ordered keywords used for page-type classification
const TYPE_KEYWORDS: [(&str, PageType); 12] = [
    ("about", PageType::About),
    ("contact", PageType::Contact),
    ("services", PageType::Services),
    ("products", PageType::Products),
    ("home", PageType::Home),
    ("index", PageType::Home),
    ("team", PageType::Team),
    ("careers", PageType::Careers),
    ("blog", PageType::Blog),
    ("news", PageType::News),
    ("pricing", PageType::Pricing),
    ("features", PageType::Features),
];

static CONTENT_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)content|main").expect("valid regex"));
static SECTION_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)section|block").expect("valid regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

pub(crate) fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css)
        .map_err(|e| CrawlError::HtmlParse(format!("Failed to parse selector '{}': {}", css, e)))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

/// Extract a page record from raw HTML
///
/// # Arguments
///
/// * `raw_html` - The HTML of the page
/// * `url` - The absolute URL the HTML was fetched from
///
/// # Returns
///
/// The extracted page record
pub fn extract(raw_html: &str, url: &str) -> Result<PageRecord, CrawlError> {
    let page_url = Url::parse(url)?;
    let document = Html::parse_document(raw_html);
    extract_document(&document, &page_url)
}

/// Extract a page record from an already parsed document
pub fn extract_document(document: &Html, page_url: &Url) -> Result<PageRecord, CrawlError> {
    let stripped = strip_boilerplate(document)?;

    let title = document
        .select(&selector("title")?)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let meta_description = match meta_content(document, r#"meta[name="description"]"#)? {
        Some(description) => description,
        None => meta_content(document, r#"meta[property="og:description"]"#)?.unwrap_or_default(),
    };

    let candidate = main_content(&stripped)?;
    let (body_text, paragraphs, sections) = match candidate {
        Some(element) => (
            element_text(element),
            extract_paragraphs(element)?,
            extract_sections(element)?,
        ),
        None => (String::new(), Vec::new(), Vec::new()),
    };

    let page_type = classify_page_type(page_url, &title);

    Ok(PageRecord {
        url: page_url.to_string(),
        title,
        meta_description,
        headings: extract_headings(document)?,
        body_text,
        paragraphs,
        sections,
        images: extract_images(document, page_url)?,
        links: extract_links(document, page_url)?,
        meta_tags: extract_meta_tags(document)?,
        structured_data: extract_structured_data(document)?,
        stylesheets: extract_stylesheets(document, page_url)?,
        word_count: count_words(&stripped),
        page_type,
    })
}

/// Copy of the document with boilerplate subtrees detached
fn strip_boilerplate(document: &Html) -> Result<Html, CrawlError> {
    let boilerplate = selector(BOILERPLATE_SELECTOR)?;
    let mut stripped = document.clone();
    let ids: Vec<_> = stripped
        .select(&boilerplate)
        .map(|element| element.id())
        .collect();
    for id in ids {
        if let Some(mut node) = stripped.tree.get_mut(id) {
            node.detach();
        }
    }
    Ok(stripped)
}

fn meta_content(document: &Html, css: &str) -> Result<Option<String>, CrawlError> {
    Ok(document
        .select(&selector(css)?)
        .filter_map(|element| element.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string))
}

fn extract_headings(document: &Html) -> Result<Headings, CrawlError> {
    let mut headings = Headings::default();
    for level in 1..=6 {
        let heading = selector(&format!("h{}", level))?;
        for element in document.select(&heading) {
            let text = element_text(element);
            if !text.is_empty() {
                headings.push(level, text);
            }
        }
    }
    Ok(headings)
}

/// First of `<main>`, `<article>`, a content-like `div`, then `<body>`
///
/// Lookups start at the root element so detached boilerplate is never a candidate.
fn main_content(document: &Html) -> Result<Option<ElementRef<'_>>, CrawlError> {
    let root = document.root_element();
    for css in ["main", "article"] {
        if let Some(element) = root.select(&selector(css)?).next() {
            return Ok(Some(element));
        }
    }

    let content_div = root.select(&selector("div[class]")?).find(|element| {
        element
            .value()
            .attr("class")
            .is_some_and(|class| CONTENT_CLASS.is_match(class))
    });
    if content_div.is_some() {
        return Ok(content_div);
    }

    Ok(root.select(&selector("body")?).next())
}

fn extract_paragraphs(candidate: ElementRef<'_>) -> Result<Vec<String>, CrawlError> {
    Ok(candidate
        .select(&selector("p")?)
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect())
}

fn extract_sections(candidate: ElementRef<'_>) -> Result<Vec<Section>, CrawlError> {
    let heading = selector("h1, h2, h3, h4")?;
    let mut sections = Vec::new();

    for element in candidate.select(&selector("section, div")?) {
        let is_section = element.value().name() == "section"
            || element
                .value()
                .attr("class")
                .is_some_and(|class| SECTION_CLASS.is_match(class));
        if !is_section {
            continue;
        }

        let text = element_text(element);
        if text.chars().count() <= MIN_SECTION_CHARS {
            continue;
        }

        let title = element
            .select(&heading)
            .next()
            .map(element_text)
            .unwrap_or_default();
        sections.push(Section {
            title,
            content: truncate_chars(&text, SECTION_PREVIEW_CHARS),
        });
    }

    Ok(sections)
}

fn extract_images(document: &Html, page_url: &Url) -> Result<Vec<ImageRecord>, CrawlError> {
    let mut images = Vec::new();
    for element in document.select(&selector("img[src]")?) {
        let attrs = element.value();
        let src = attrs.attr("src").unwrap_or_default().trim();
        if src.is_empty() {
            continue;
        }
        let Ok(resolved) = page_url.join(src) else {
            debug!("Skipping image with unresolvable src '{}'", src);
            continue;
        };

        let attr = |name: &str| attrs.attr(name).unwrap_or_default().trim().to_string();
        let alt = attr("alt");
        images.push(ImageRecord {
            src: resolved.to_string(),
            has_alt: !alt.is_empty(),
            alt,
            title: attr("title"),
            width: attr("width"),
            height: attr("height"),
            loading: attr("loading"),
        });
    }
    Ok(images)
}

/// Resolve an anchor href to an absolute http(s) URL without fragment
pub(crate) fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lowered = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("javascript:")
    {
        return None;
    }

    let mut resolved = page_url.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved)
}

fn extract_links(document: &Html, page_url: &Url) -> Result<Links, CrawlError> {
    let base_host = page_url.host_str();
    let mut links = Links::default();

    for element in document.select(&selector("a[href]")?) {
        let attrs = element.value();
        let Some(resolved) = resolve_href(page_url, attrs.attr("href").unwrap_or_default()) else {
            continue;
        };

        let is_internal = resolved.host_str() == base_host;
        let link = LinkRecord {
            url: resolved.to_string(),
            text: element_text(element),
            title: attrs.attr("title").unwrap_or_default().trim().to_string(),
            rel: attrs
                .attr("rel")
                .map(|rel| rel.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            target: attrs.attr("target").unwrap_or_default().trim().to_string(),
        };

        if is_internal {
            links.internal.push(link);
        } else {
            links.external.push(link);
        }
    }

    Ok(links)
}

fn extract_meta_tags(document: &Html) -> Result<BTreeMap<String, String>, CrawlError> {
    let mut tags = BTreeMap::new();

    for element in document.select(&selector("meta")?) {
        let attrs = element.value();
        let key = attrs
            .attr("name")
            .or_else(|| attrs.attr("property"))
            .or_else(|| attrs.attr("http-equiv"));
        if let (Some(key), Some(content)) = (key, attrs.attr("content")) {
            let key = key.trim().to_lowercase();
            if !key.is_empty() {
                tags.insert(key, content.trim().to_string());
            }
        }
    }

    if let Some(href) = document
        .select(&selector(r#"link[rel~="canonical"][href]"#)?)
        .find_map(|element| element.value().attr("href"))
    {
        tags.insert("canonical".to_string(), href.trim().to_string());
    }

    if let Some(lang) = document
        .select(&selector("html[lang]")?)
        .find_map(|element| element.value().attr("lang"))
    {
        tags.insert("lang".to_string(), lang.trim().to_string());
    }

    Ok(tags)
}

fn extract_structured_data(document: &Html) -> Result<Vec<StructuredData>, CrawlError> {
    let mut data = Vec::new();

    for element in document.select(&selector(r#"script[type="application/ld+json"]"#)?) {
        let body = element.text().collect::<String>();
        match serde_json::from_str::<serde_json::Value>(body.trim()) {
            Ok(value) => data.push(StructuredData::JsonLd(value)),
            Err(e) => debug!("Skipping unparsable JSON-LD block: {}", e),
        }
    }

    for element in document.select(&selector("[itemtype]")?) {
        let attrs = element.value();
        data.push(StructuredData::Microdata(Microdata {
            itemtype: attrs.attr("itemtype").unwrap_or_default().trim().to_string(),
            itemscope: attrs.attr("itemscope").is_some(),
        }));
    }

    Ok(data)
}

fn extract_stylesheets(document: &Html, page_url: &Url) -> Result<Vec<String>, CrawlError> {
    Ok(document
        .select(&selector(r#"link[rel~="stylesheet"][href]"#)?)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| page_url.join(href).ok())
        .map(|url| url.to_string())
        .collect())
}

fn count_words(stripped: &Html) -> usize {
    let text = stripped.root_element().text().collect::<String>().to_lowercase();
    WORD.find_iter(&text).count()
}

/// Classify a page from its URL path and title
///
/// Known keywords are tried in a fixed order against the lower-cased path and title.
/// Blog-like and shop-like paths come next; a path ending in `/` or with a single
/// segment is the home page; anything else is `Other`.
pub fn classify_page_type(url: &Url, title: &str) -> PageType {
    let path = url.path().to_lowercase();
    let title = title.to_lowercase();

    for (keyword, page_type) in TYPE_KEYWORDS {
        if path.contains(keyword) || title.contains(keyword) {
            return page_type;
        }
    }

    if ["blog", "news", "article"].iter().any(|k| path.contains(k)) {
        return PageType::Blog;
    }
    if ["shop", "store", "product"].iter().any(|k| path.contains(k)) {
        return PageType::Product;
    }

    // scheme "//" plus the path's own slashes
    if path.ends_with('/') || 2 + path.matches('/').count() <= 3 {
        return PageType::Home;
    }

    PageType::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Acme Widgets</title>
  <meta property="og:description" content="Widgets for everyone">
  <meta name="Viewport" content="width=device-width">
  <link rel="canonical" href="https://acme.test/">
  <link rel="stylesheet" href="/css/site.css">
  <script type="application/ld+json">{"@type": "Organization", "name": "Acme"}</script>
  <script type="application/ld+json">{not json}</script>
  <style>body { color: red; }</style>
</head>
<body>
  <header><nav><a href="/about">About us</a></nav></header>
  <main>
    <h1>Widgets built to last</h1>
    <p>Short intro.</p>
    <p>Our widgets are machined from a single block of steel.</p>
    <section>
      <h2>Why Acme</h2>
      <p>Every widget ships with a lifetime warranty and free repairs.</p>
    </section>
    <img src="/img/hero.png" alt="Hero widget" width="640" height="480">
    <img src="logo.svg" alt="   ">
    <a href="https://partner.test/shop#top">Partner</a>
    <a href="#section">Skip</a>
    <a href="mailto:hi@acme.test">Mail</a>
    <a href="/contact" rel="nofollow noopener" target="_blank">Contact</a>
  </main>
  <div itemscope itemtype="https://schema.org/Product">Gadget</div>
  <footer><a href="/privacy">Privacy</a></footer>
  <script>var tracking = "ignored words here";</script>
</body>
</html>"##;

    #[test]
    fn test_extract_title_meta_and_headings() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();

        assert_eq!(page.url, "https://acme.test/");
        assert_eq!(page.title, "Acme Widgets");
        assert_eq!(page.meta_description, "Widgets for everyone");
        assert_eq!(page.headings.h1, vec!["Widgets built to last".to_string()]);
        assert_eq!(page.headings.h2, vec!["Why Acme".to_string()]);
        assert_eq!(page.page_type, PageType::Home);

        assert_eq!(
            page.meta_tags.get("viewport").map(String::as_str),
            Some("width=device-width")
        );
        assert_eq!(
            page.meta_tags.get("canonical").map(String::as_str),
            Some("https://acme.test/")
        );
        assert_eq!(page.meta_tags.get("lang").map(String::as_str), Some("en"));
    }

    #[test]
    fn test_extract_content_paragraphs_and_sections() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();

        assert!(page.body_text.starts_with("Widgets built to last Short intro."));
        assert!(!page.body_text.contains("About us"));
        assert_eq!(page.paragraphs.len(), 2);
        assert!(page.paragraphs.iter().all(|p| p.chars().count() > 20));

        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.sections[0].title, "Why Acme");
        assert!(page.sections[0].content.contains("lifetime warranty"));
    }

    #[test]
    fn test_extract_images_and_alt_text() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();

        assert_eq!(page.images.len(), 2);
        assert_eq!(page.images[0].src, "https://acme.test/img/hero.png");
        assert_eq!(page.images[0].width, "640");
        assert!(page.images[0].has_alt);
        assert_eq!(page.images[1].src, "https://acme.test/logo.svg");
        assert!(!page.images[1].has_alt);
        for image in &page.images {
            assert_eq!(image.has_alt, !image.alt.trim().is_empty());
        }
    }

    #[test]
    fn test_extract_links_classifies_and_skips() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();

        let internal: Vec<&str> = page.links.internal.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            internal,
            vec![
                "https://acme.test/about",
                "https://acme.test/contact",
                "https://acme.test/privacy"
            ]
        );
        assert_eq!(page.links.external.len(), 1);
        assert_eq!(page.links.external[0].url, "https://partner.test/shop");

        let contact = &page.links.internal[1];
        assert_eq!(contact.rel, vec!["nofollow".to_string(), "noopener".to_string()]);
        assert_eq!(contact.target, "_blank");
        assert_eq!(contact.text, "Contact");
    }

    #[test]
    fn test_extract_structured_data_and_stylesheets() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();

        assert_eq!(page.structured_data.len(), 2);
        match &page.structured_data[0] {
            StructuredData::JsonLd(value) => assert_eq!(value["name"], "Acme"),
            other => panic!("expected JSON-LD, got {:?}", other),
        }
        match &page.structured_data[1] {
            StructuredData::Microdata(item) => {
                assert_eq!(item.itemtype, "https://schema.org/Product");
                assert!(item.itemscope);
            }
            other => panic!("expected microdata, got {:?}", other),
        }

        assert_eq!(page.stylesheets, vec!["https://acme.test/css/site.css".to_string()]);
    }

    #[test]
    fn test_word_count_excludes_boilerplate() {
        let page = extract(FIXTURE, "https://acme.test/").unwrap();
        // title (2) + main (32) + microdata div (1); nav, footer and scripts excluded
        assert_eq!(page.word_count, 35);
    }

    #[test]
    fn test_word_count_scope_is_wider_than_body_text() {
        let html = r#"<html><body>
            <div class="sidebar">Extra words here</div>
            <main><p>Main text only</p></main>
        </body></html>"#;
        let page = extract(html, "https://acme.test/").unwrap();

        assert_eq!(page.body_text, "Main text only");
        assert_eq!(page.word_count, 6);
    }

    #[test]
    fn test_content_div_inside_header_is_not_main_content() {
        let html = r#"<html><body>
            <header><div class="main-menu"><p>Header navigation blurb that is long enough</p></div></header>
            <div class="wrapper"><p>The real body paragraph of this page is here.</p></div>
        </body></html>"#;
        let page = extract(html, "https://acme.test/").unwrap();

        assert_eq!(page.body_text, "The real body paragraph of this page is here.");
        assert_eq!(
            page.paragraphs,
            vec!["The real body paragraph of this page is here.".to_string()]
        );
        assert!(page.sections.iter().all(|s| !s.content.contains("Header")));
        assert_eq!(page.word_count, 9);
    }

    #[test]
    fn test_main_content_falls_back_to_content_div_then_body() {
        let html = r#"<html><body><div class="page-Content">Inside</div><p>Outside</p></body></html>"#;
        let page = extract(html, "https://acme.test/").unwrap();
        assert_eq!(page.body_text, "Inside");

        let html = r#"<html><body><p>Only body</p></body></html>"#;
        let page = extract(html, "https://acme.test/").unwrap();
        assert_eq!(page.body_text, "Only body");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let first = extract(FIXTURE, "https://acme.test/").unwrap();
        let second = extract(FIXTURE, "https://acme.test/").unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_extract_handles_malformed_markup() {
        let page = extract("<div><p>unclosed <b>tags", "https://acme.test/x/y").unwrap();
        assert_eq!(page.title, "");
        assert_eq!(page.word_count, 2);
        assert_eq!(page.page_type, PageType::Other);
    }

    #[test]
    fn test_classify_page_type() {
        let classify = |url: &str, title: &str| classify_page_type(&Url::parse(url).unwrap(), title);

        assert_eq!(classify("https://acme.test/about-us", "Acme"), PageType::About);
        assert_eq!(classify("https://acme.test/", "Acme | Pricing"), PageType::Pricing);
        assert_eq!(classify("https://acme.test/blog/2024/launch", "Launch"), PageType::Blog);
        assert_eq!(classify("https://acme.test/articles/x/y", "Launch"), PageType::Blog);
        assert_eq!(classify("https://acme.test/shop/widgets/blue", "Blue"), PageType::Product);
        assert_eq!(classify("https://acme.test/our-products", "Range"), PageType::Products);
        assert_eq!(classify("https://acme.test/index.html", "Acme"), PageType::Home);
        assert_eq!(classify("https://acme.test/landing", "Offer"), PageType::Home);
        assert_eq!(classify("https://acme.test/a/b", "Offer"), PageType::Other);
        assert_eq!(classify("https://acme.test/a/b/", "Offer"), PageType::Home);
    }
}
