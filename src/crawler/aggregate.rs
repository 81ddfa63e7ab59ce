//! Aggregation of page records into a [`SiteDocument`]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::crawler::{ContentThemes, Headings, LinkRecord, PageRecord, PageType, SiteDocument};

const DETAILED_IMAGES: usize = 50;
const SAMPLE_INTERNAL_LINKS: usize = 20;
const SAMPLE_EXTERNAL_LINKS: usize = 10;
const CANDIDATE_KEYWORDS: usize = 20;
const TOP_KEYWORDS: usize = 10;

const STOP_WORDS: [&str; 68] = [
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see",
    "two", "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use", "will",
    "with", "have", "this", "that", "from", "they", "know", "want", "been", "good", "much",
    "some", "time", "very", "when", "come", "here", "just", "like", "long", "make", "many",
    "over", "such", "take", "than", "them", "well", "were",
];

static KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").expect("valid regex"));

/// Word frequencies, most common first; ties keep first-occurrence order
fn most_common<'a>(words: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for word in words {
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn content_themes(pages: &[PageRecord], headings: &Headings) -> ContentThemes {
    let body = pages
        .iter()
        .map(|page| page.body_text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let frequencies = most_common(KEYWORD.find_iter(&body).map(|m| m.as_str()));

    let top_keywords = frequencies
        .iter()
        .take(CANDIDATE_KEYWORDS)
        .map(|(word, _)| *word)
        .filter(|word| !is_stop_word(word) && word.len() > 3)
        .take(TOP_KEYWORDS)
        .map(str::to_string)
        .collect();

    let heading_text = headings
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let heading_keywords = most_common(KEYWORD.find_iter(&heading_text).map(|m| m.as_str()))
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, _)| word)
        .filter(|word| !is_stop_word(word))
        .map(str::to_string)
        .collect();

    let body_words: usize = pages
        .iter()
        .map(|page| page.body_text.split_whitespace().count())
        .sum();
    let avg_words_per_page = if pages.is_empty() {
        0.0
    } else {
        body_words as f64 / pages.len() as f64
    };

    ContentThemes {
        top_keywords,
        total_unique_words: frequencies.len(),
        avg_words_per_page,
        heading_keywords,
    }
}

fn distinct_urls(links: &[&LinkRecord]) -> usize {
    links
        .iter()
        .map(|link| link.url.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Merge meta tags across pages
///
/// Home pages overwrite keys; every other page only contributes keys not yet present.
fn merge_meta_tags(pages: &[PageRecord]) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for page in pages {
        for (key, value) in &page.meta_tags {
            if page.page_type == PageType::Home {
                merged.insert(key.clone(), value.clone());
            } else {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }
    merged
}

/// Build the site-level view over all successfully parsed pages
///
/// # Arguments
///
/// * `base_url` - Normalized base URL of the crawl
/// * `pages` - Page records in crawl order, root page first
pub fn build_site_document(base_url: &str, pages: Vec<PageRecord>) -> SiteDocument {
    let mut all_headings = Headings::default();
    for page in &pages {
        all_headings.extend_from(&page.headings);
    }

    let images: Vec<_> = pages.iter().flat_map(|page| &page.images).collect();
    let internal: Vec<_> = pages.iter().flat_map(|page| &page.links.internal).collect();
    let external: Vec<_> = pages.iter().flat_map(|page| &page.links.external).collect();

    let page_types_found: BTreeSet<PageType> = pages.iter().map(|page| page.page_type).collect();

    SiteDocument {
        base_url: base_url.to_string(),
        pages_analyzed: pages.len(),
        total_word_count: pages.iter().map(|page| page.word_count).sum(),
        image_count: images.len(),
        images_without_alt: images.iter().filter(|image| !image.has_alt).count(),
        internal_links_count: distinct_urls(&internal),
        external_links_count: distinct_urls(&external),
        meta_tags: merge_meta_tags(&pages),
        structured_data: pages
            .iter()
            .flat_map(|page| page.structured_data.iter().cloned())
            .collect(),
        page_types_found: page_types_found.into_iter().collect(),
        content_themes: content_themes(&pages, &all_headings),
        detailed_images: images.iter().take(DETAILED_IMAGES).map(|&i| i.clone()).collect(),
        sample_internal_links: internal
            .iter()
            .take(SAMPLE_INTERNAL_LINKS)
            .map(|&l| l.clone())
            .collect(),
        sample_external_links: external
            .iter()
            .take(SAMPLE_EXTERNAL_LINKS)
            .map(|&l| l.clone())
            .collect(),
        all_headings,
        pages,
    }
}
