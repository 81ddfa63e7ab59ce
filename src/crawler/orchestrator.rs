//! Crawl orchestration: root page, frontier, paced follow-up fetches, aggregation

use std::collections::HashSet;

use scraper::Html;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::aggregate::build_site_document;
use crate::crawler::content_extraction::{extract, extract_document};
use crate::crawler::error::CrawlError;
use crate::crawler::frontier::select_targets;
use crate::crawler::{CrawlerConfig, PageRecord, SiteDocument};
use crate::http::Fetcher;

/// Normalize a user-supplied site URL
///
/// A missing scheme becomes `https://` and trailing slashes are removed.
pub fn normalize_base_url(input: &str) -> Result<String, CrawlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CrawlError::InvalidBaseUrl("empty URL".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let normalized = with_scheme.trim_end_matches('/').to_string();

    let parsed = Url::parse(&normalized)
        .map_err(|e| CrawlError::InvalidBaseUrl(format!("{}: {}", input, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(CrawlError::InvalidBaseUrl(format!(
            "{}: only http(s) URLs with a host can be crawled",
            input
        )));
    }

    Ok(normalized)
}

/// Parse the root page once for both its record and its crawl targets
fn parse_root(raw_html: &str, base: &str) -> Result<(PageRecord, Vec<String>), CrawlError> {
    let base_url = Url::parse(base)?;
    let document = Html::parse_document(raw_html);
    let record = extract_document(&document, &base_url)?;
    let targets = select_targets(&base_url, &document)?;
    Ok((record, targets))
}

/// Sequential, politely paced site crawler
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: Fetcher,
    config: CrawlerConfig,
}

impl Crawler {
    /// Create a crawler with its own fetcher built from the configuration
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = Fetcher::with_options(&config.user_agent, config.request_timeout())?;
        Ok(Self { fetcher, config })
    }

    /// Create a crawler that shares an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, config: CrawlerConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Crawl a site and aggregate every page that could be parsed
    ///
    /// # Arguments
    ///
    /// * `base_url` - Site URL, with or without scheme
    ///
    /// # Returns
    ///
    /// The aggregated [`SiteDocument`], or [`CrawlError::MainPageUnavailable`] when the
    /// root page cannot be fetched or parsed
    #[instrument(skip(self), fields(max_pages = self.config.max_pages))]
    pub async fn crawl(&self, base_url: &str) -> Result<SiteDocument, CrawlError> {
        let base = normalize_base_url(base_url)?;
        info!("Starting crawl of {}", base);

        let root = self
            .fetcher
            .fetch(&base)
            .await
            .map_err(|e| CrawlError::MainPageUnavailable {
                url: base.clone(),
                cause: e.to_string(),
            })?;
        let (root_page, targets) =
            parse_root(&root, &base).map_err(|e| CrawlError::MainPageUnavailable {
                url: base.clone(),
                cause: e.to_string(),
            })?;
        debug!("Frontier of {}: {:?}", base, targets);

        let mut visited: HashSet<String> = HashSet::from([base.clone(), root_page.url.clone()]);
        let mut pages = vec![root_page];

        for target in targets
            .into_iter()
            .take(self.config.additional_page_budget())
        {
            if !visited.insert(target.clone()) {
                debug!("Already visited {}", target);
                continue;
            }

            let delay = self.config.delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch_page(&target).await {
                Ok(page) => pages.push(page),
                Err(e) => warn!("Skipping {}: {}", target, e),
            }
        }

        let site = build_site_document(&base, pages);
        info!(
            "Crawl of {} finished: {} pages, {} words",
            base, site.pages_analyzed, site.total_word_count
        );
        Ok(site)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageRecord, CrawlError> {
        let raw_html = self.fetcher.fetch(url).await?;
        extract(&raw_html, url)
    }
}

/// Crawl a website with the given configuration
///
/// # Arguments
///
/// * `url` - The site to crawl
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The aggregated site document
pub async fn crawl_website(url: &str, config: CrawlerConfig) -> Result<SiteDocument, CrawlError> {
    Crawler::new(config)?.crawl(url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::PageType;
    use mockito::Server;

    fn root_html() -> String {
        r#"<html><head><title>Acme</title></head><body>
            <nav>
              <a href="/about">About</a>
              <a href="/contact">Contact</a>
              <a href="/services">Services</a>
            </nav>
            <main><h1>Welcome</h1><p>Widgets for every workshop and garage.</p></main>
        </body></html>"#
            .to_string()
    }

    fn page_html(title: &str) -> String {
        format!(
            "<html><head><title>{title}</title></head><body><main><h1>{title}</h1></main></body></html>"
        )
    }

    fn test_config(max_pages: usize) -> CrawlerConfig {
        CrawlerConfig::builder()
            .max_pages(max_pages)
            .delay_ms(0)
            .build()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("acme.test/").unwrap(), "https://acme.test");
        assert_eq!(
            normalize_base_url(" http://acme.test/shop// ").unwrap(),
            "http://acme.test/shop"
        );
        assert!(matches!(
            normalize_base_url(""),
            Err(CrawlError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            normalize_base_url("ftp://acme.test"),
            Err(CrawlError::InvalidBaseUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_crawl_skips_failed_pages() {
        let mut server = Server::new_async().await;
        let root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(root_html())
            .expect(1)
            .create_async()
            .await;
        let about = server
            .mock("GET", "/about")
            .with_status(200)
            .with_body(page_html("About"))
            .expect(1)
            .create_async()
            .await;
        let contact = server
            .mock("GET", "/contact")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let services = server
            .mock("GET", "/services")
            .with_status(200)
            .with_body(page_html("Services"))
            .expect(1)
            .create_async()
            .await;

        let crawler = Crawler::new(test_config(10)).unwrap();
        let site = crawler.crawl(&server.url()).await.unwrap();

        assert_eq!(site.base_url, server.url());
        assert_eq!(site.pages_analyzed, 3);
        assert_eq!(site.pages.len(), site.pages_analyzed);
        assert_eq!(site.pages[0].page_type, PageType::Home);
        assert_eq!(site.pages[1].title, "About");
        assert_eq!(site.pages[2].title, "Services");
        assert_eq!(
            site.total_word_count,
            site.pages.iter().map(|p| p.word_count).sum::<usize>()
        );

        root.assert_async().await;
        about.assert_async().await;
        contact.assert_async().await;
        services.assert_async().await;
    }

    #[tokio::test]
    async fn test_crawl_respects_page_budget() {
        let mut server = Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(root_html())
            .create_async()
            .await;
        let about = server
            .mock("GET", "/about")
            .with_status(200)
            .with_body(page_html("About"))
            .expect(1)
            .create_async()
            .await;
        let contact = server
            .mock("GET", "/contact")
            .with_status(200)
            .with_body(page_html("Contact"))
            .expect(0)
            .create_async()
            .await;

        let site = crawl_website(&server.url(), test_config(2)).await.unwrap();
        assert_eq!(site.pages_analyzed, 2);

        about.assert_async().await;
        contact.assert_async().await;
    }

    #[tokio::test]
    async fn test_crawl_fails_when_root_unavailable() {
        let mut server = Server::new_async().await;
        let _root = server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let result = crawl_website(&server.url(), test_config(5)).await;
        match result {
            Err(CrawlError::MainPageUnavailable { url, cause }) => {
                assert_eq!(url, server.url());
                assert!(cause.contains("503"));
            }
            other => panic!("expected main page failure, got {:?}", other),
        }
    }
}
