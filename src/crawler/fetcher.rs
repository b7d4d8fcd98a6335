//! HTTP fetching for the content source
//!
//! All requests go through [`ContentSource`], which enforces the fixed
//! inter-request delay after every attempt and classifies failures into
//! the two-valued absence signal the orchestrator consumes:
//!
//! - [`FetchError::NotFound`] — the page (or its expected content
//!   container) does not exist; probing past it is pointless.
//! - [`FetchError::Transient`] — timeouts, connection failures, HTTP 429
//!   and 5xx, retried a bounded number of times before being reported.
//!
//! The split matters: only `NotFound` may terminate a novel's chapter
//! discovery for good, while a `Transient` failure leaves the novel
//! resumable at the same sequence.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::UserAgentConfig;
use crate::crawler::parser::{self, ScrapedChapter, ScrapedNovel};

/// Extra attempts after the first, for transient failures only
const TRANSIENT_RETRIES: u32 = 2;

/// Absence signal for a single fetch
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("not found")]
    NotFound,

    #[error("transient failure: {0}")]
    Transient(String),
}

/// Builds the HTTP client with the polite user agent string
/// `Name/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The content source adapter: fetches pages sequentially and exposes the
/// three scraping operations the orchestrator needs.
pub struct ContentSource {
    client: Client,
    delay: Duration,
    placeholder: String,
}

impl ContentSource {
    pub fn new(client: Client, delay: Duration, placeholder: String) -> Self {
        Self {
            client,
            delay,
            placeholder,
        }
    }

    /// Novel detail-page URLs listed on one catalog page. An empty vec is
    /// the pagination termination signal, not an error.
    pub async fn novel_urls_on_page(&self, page_url: &Url) -> Result<Vec<Url>, FetchError> {
        let body = self.fetch_html(page_url).await?;
        let urls = parser::extract_novel_urls(&body, page_url);
        tracing::info!("Found {} novels on {}", urls.len(), page_url);
        Ok(urls)
    }

    /// Scrapes one novel's detail page.
    pub async fn novel_detail(&self, url: &Url) -> Result<ScrapedNovel, FetchError> {
        tracing::debug!("Scraping novel details from {}", url);
        let body = self.fetch_html(url).await?;
        Ok(parser::extract_novel(&body, url, &self.placeholder))
    }

    /// Probes one chapter page. A page without the expected content
    /// container counts as `NotFound`, same as a missing page.
    pub async fn chapter_detail(
        &self,
        url: &Url,
        expected_sequence: u32,
    ) -> Result<ScrapedChapter, FetchError> {
        tracing::debug!("Probing chapter {} at {}", expected_sequence, url);
        let body = self.fetch_html(url).await?;
        parser::extract_chapter(&body, expected_sequence).ok_or(FetchError::NotFound)
    }

    /// Fetches a page body, sleeping the configured delay after every
    /// attempt. 404/410 map to `NotFound` immediately; everything else
    /// retriable is retried up to [`TRANSIENT_RETRIES`] extra times.
    async fn fetch_html(&self, url: &Url) -> Result<String, FetchError> {
        let mut last_failure = String::new();

        for attempt in 0..=TRANSIENT_RETRIES {
            if attempt > 0 {
                tracing::debug!("Retrying {} (attempt {})", url, attempt + 1);
            }

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                        self.pause().await;
                        return Err(FetchError::NotFound);
                    }
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                self.pause().await;
                                return Ok(body);
                            }
                            Err(e) => last_failure = format!("body read failed: {}", e),
                        }
                    } else {
                        last_failure = format!("HTTP {}", status);
                    }
                }
                Err(e) => {
                    last_failure = if e.is_timeout() {
                        "request timeout".to_string()
                    } else if e.is_connect() {
                        "connection failed".to_string()
                    } else {
                        e.to_string()
                    };
                }
            }
            self.pause().await;
        }

        tracing::warn!("Giving up on {}: {}", url, last_failure);
        Err(FetchError::Transient(last_failure))
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_source(delay_ms: u64) -> ContentSource {
        let config = UserAgentConfig {
            crawler_name: "Chapterline".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        ContentSource::new(
            build_http_client(&config).unwrap(),
            Duration::from_millis(delay_ms),
            "n/a".to_string(),
        )
    }

    #[test]
    fn test_build_http_client() {
        let config = UserAgentConfig {
            crawler_name: "Chapterline".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        assert!(build_http_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_404_is_not_found_without_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let source = test_source(0);
        let url = Url::parse(&format!("{}/gone", server.uri())).unwrap();
        assert!(matches!(
            source.fetch_html(&url).await,
            Err(FetchError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_5xx_is_retried_then_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .expect(u64::from(TRANSIENT_RETRIES) + 1)
            .mount(&server)
            .await;

        let source = test_source(0);
        let url = Url::parse(&format!("{}/flaky", server.uri())).unwrap();
        assert!(matches!(
            source.fetch_html(&url).await,
            Err(FetchError::Transient(_))
        ));
    }

    #[tokio::test]
    async fn test_success_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let source = test_source(0);
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        assert_eq!(source.fetch_html(&url).await.unwrap(), "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_chapter_without_container_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ch"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>empty</body></html>"),
            )
            .mount(&server)
            .await;

        let source = test_source(0);
        let url = Url::parse(&format!("{}/ch", server.uri())).unwrap();
        assert!(matches!(
            source.chapter_detail(&url, 1).await,
            Err(FetchError::NotFound)
        ));
    }
}
