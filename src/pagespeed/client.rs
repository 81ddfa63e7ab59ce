//! HTTP client for the PageSpeed Insights API

use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::pagespeed::config::{CATEGORIES, PageSpeedConfig};
use crate::pagespeed::error::PageSpeedError;
use crate::pagespeed::normalize::normalize;
use crate::pagespeed::types::{PerformanceDocument, PerformanceReport, RawResponse, Strategy};

/// Reject anything that is not an http(s) URL
fn validate_url(url: &str) -> Result<(), PageSpeedError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(PageSpeedError::InvalidUrl(url.to_string()))
    }
}

/// PageSpeed Insights client with bounded retries
///
/// Rate-limit responses, timeouts and connection failures are retried with exponential
/// backoff; 400 and 403 fail immediately.
#[derive(Debug, Clone)]
pub struct PageSpeedClient {
    client: ReqwestClient,
    config: PageSpeedConfig,
}

impl PageSpeedClient {
    pub fn new(config: PageSpeedConfig) -> Result<Self, PageSpeedError> {
        let client = ReqwestClient::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PageSpeedConfig {
        &self.config
    }

    fn query(&self, url: &str, strategy: Strategy) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("url", url.to_string()),
            ("strategy", strategy.as_str().to_string()),
        ];
        query.extend(CATEGORIES.iter().map(|c| ("category", c.to_string())));
        if let Some(key) = &self.config.api_key {
            query.push(("key", key.clone()));
        }
        query
    }

    async fn backoff(&self, attempt: u32, reason: &str) {
        let delay = self.config.backoff(attempt);
        warn!(
            "{}, retrying in {:?} (attempt {}/{})",
            reason, delay, attempt, self.config.max_attempts
        );
        tokio::time::sleep(delay).await;
    }

    async fn request(&self, url: &str, strategy: Strategy) -> Result<RawResponse, PageSpeedError> {
        let query = self.query(url, strategy);
        let max_attempts = self.config.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                "PageSpeed request for {} ({}), attempt {}/{}",
                url, strategy, attempt, max_attempts
            );

            let response = match self
                .client
                .get(&self.config.endpoint)
                .query(&query)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if e.is_timeout() => {
                    if attempt < max_attempts {
                        self.backoff(attempt, "Request timed out").await;
                        continue;
                    }
                    return Err(PageSpeedError::Timeout { attempts: attempt });
                }
                Err(e) if e.is_connect() => {
                    if attempt < max_attempts {
                        self.backoff(attempt, "Connection error").await;
                        continue;
                    }
                    return Err(PageSpeedError::Connection {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempt < max_attempts {
                        self.backoff(attempt, "Rate limited").await;
                        continue;
                    }
                    return Err(PageSpeedError::RateLimited { attempts: attempt });
                }
                StatusCode::BAD_REQUEST => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(PageSpeedError::InvalidRequest(message));
                }
                StatusCode::FORBIDDEN => return Err(PageSpeedError::Forbidden),
                status if !status.is_success() => {
                    let message = response.text().await.unwrap_or_default();
                    return Err(PageSpeedError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                _ => {
                    let body = response.text().await?;
                    return Ok(serde_json::from_str(&body)?);
                }
            }
        }
    }

    /// Measure one URL for one device profile
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute http(s) URL to measure
    /// * `strategy` - Mobile or desktop
    ///
    /// # Returns
    ///
    /// The normalized document, or the first non-retryable error
    #[instrument(skip(self))]
    pub async fn measure(
        &self,
        url: &str,
        strategy: Strategy,
    ) -> Result<PerformanceDocument, PageSpeedError> {
        validate_url(url)?;
        let api_key_used = self.config.api_key.is_some();
        if !api_key_used {
            warn!("No PageSpeed API key configured, using the public rate limit");
        }

        let raw = self.request(url, strategy).await?;
        let document = normalize(&raw, url, strategy, api_key_used);
        info!(
            "PageSpeed {} score for {}: {:.2}",
            strategy, url, document.performance_score
        );
        Ok(document)
    }

    /// Measure both device profiles; either failure fails the report
    #[instrument(skip(self))]
    pub async fn analyze_url(&self, url: &str) -> Result<PerformanceReport, PageSpeedError> {
        let (mobile, desktop) = tokio::try_join!(
            self.measure(url, Strategy::Mobile),
            self.measure(url, Strategy::Desktop)
        )?;
        Ok(PerformanceReport::new(url, mobile, desktop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagespeed::normalize::tests::sample_response;
    use mockito::{Matcher, Server};

    fn client_for(endpoint: String) -> PageSpeedClient {
        let config = PageSpeedConfig::builder()
            .endpoint(endpoint)
            .backoff_base_ms(0)
            .build();
        PageSpeedClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_measure_sends_expected_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("url".into(), "https://acme.test".into()),
                Matcher::UrlEncoded("strategy".into(), "mobile".into()),
                Matcher::Regex("category=performance".into()),
                Matcher::Regex("category=accessibility".into()),
                Matcher::Regex("category=best-practices".into()),
                Matcher::Regex("category=seo".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(sample_response().to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(format!("{}/runPagespeed", server.url()));
        let document = client
            .measure("https://acme.test", Strategy::Mobile)
            .await
            .unwrap();

        assert_eq!(document.strategy, Strategy::Mobile);
        assert_eq!(document.vital("largest_contentful_paint").unwrap().value, 5.0);
        assert!(!document.api_key_used);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_then_fails() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::Any)
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(format!("{}/runPagespeed", server.url()));
        let result = client.measure("https://acme.test", Strategy::Desktop).await;

        assert!(matches!(
            result,
            Err(PageSpeedError::RateLimited { attempts: 3 })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_forbidden_and_bad_request_are_not_retried() {
        let mut server = Server::new_async().await;
        let forbidden = server
            .mock("GET", "/forbidden")
            .match_query(Matcher::Any)
            .with_status(403)
            .expect(1)
            .create_async()
            .await;
        let bad_request = server
            .mock("GET", "/bad")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body("invalid url")
            .expect(1)
            .create_async()
            .await;

        let result = client_for(format!("{}/forbidden", server.url()))
            .measure("https://acme.test", Strategy::Mobile)
            .await;
        assert!(matches!(result, Err(PageSpeedError::Forbidden)));

        let result = client_for(format!("{}/bad", server.url()))
            .measure("https://acme.test", Strategy::Mobile)
            .await;
        match result {
            Err(PageSpeedError::InvalidRequest(message)) => assert_eq!(message, "invalid url"),
            other => panic!("expected invalid request, got {:?}", other),
        }

        forbidden.assert_async().await;
        bad_request.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let result = client_for(format!("{}/runPagespeed", server.url()))
            .measure("https://acme.test", Strategy::Mobile)
            .await;
        match result {
            Err(PageSpeedError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_errors_exhaust_attempts() {
        let client = client_for("http://127.0.0.1:1/runPagespeed".to_string());
        let result = client.measure("https://acme.test", Strategy::Mobile).await;
        assert!(matches!(
            result,
            Err(PageSpeedError::Connection { attempts: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let client = client_for("http://127.0.0.1:1/runPagespeed".to_string());
        let result = client.measure("acme.test", Strategy::Mobile).await;
        assert!(matches!(result, Err(PageSpeedError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_analyze_url_combines_strategies() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(sample_response().to_string())
            .expect(2)
            .create_async()
            .await;

        let report = client_for(format!("{}/runPagespeed", server.url()))
            .analyze_url("https://acme.test")
            .await
            .unwrap();

        assert_eq!(report.mobile.strategy, Strategy::Mobile);
        assert_eq!(report.desktop.strategy, Strategy::Desktop);
        assert_eq!(report.overall.avg_performance, 0.42);
        assert_eq!(report.comparison.seo_diff, 0.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_analyze_url_fails_when_one_strategy_fails() {
        let mut server = Server::new_async().await;
        let _mobile = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::UrlEncoded("strategy".into(), "mobile".into()))
            .with_status(200)
            .with_body(sample_response().to_string())
            .create_async()
            .await;
        let _desktop = server
            .mock("GET", "/runPagespeed")
            .match_query(Matcher::UrlEncoded("strategy".into(), "desktop".into()))
            .with_status(403)
            .create_async()
            .await;

        let result = client_for(format!("{}/runPagespeed", server.url()))
            .analyze_url("https://acme.test")
            .await;
        assert!(matches!(result, Err(PageSpeedError::Forbidden)));
    }
}
