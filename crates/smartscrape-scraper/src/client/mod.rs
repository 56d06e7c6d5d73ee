//! HTTP access for product pages and product images.

mod origin;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use smartscrape_core::ScraperConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub(crate) use origin::{absolutize_url, extract_domain};
pub use origin::{extract_host, url_key};

/// Fetches raw page bodies and image bytes.
///
/// The orchestrator and facade depend on this trait rather than on
/// [`HttpFetcher`] so tests can substitute canned responses.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the HTML body of `url`.
    ///
    /// Implementations retry transient failures themselves; an `Err` means
    /// the page is given up on.
    async fn fetch_html(&self, url: &str) -> Result<String, ScraperError>;

    /// Fetches raw image bytes with the short image timeout. Not retried.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScraperError>;
}

/// `reqwest`-backed [`PageFetcher`] with browser-like default headers.
///
/// One instance is shared by every worker of a search; `reqwest::Client`
/// keeps its connection pool behind an `Arc`, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    page_timeout: Duration,
    image_timeout: Duration,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Linear backoff step in milliseconds.
    retry_backoff_ms: u64,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with the configured user agent, timeouts,
    /// and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config), or
    /// [`ScraperError::InvalidUrl`] if the user agent is not a valid header.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,es;q=0.8,fr;q=0.7,de;q=0.6"),
        );
        headers.insert(reqwest::header::DNT, HeaderValue::from_static("1"));
        headers.insert(
            reqwest::header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.page_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            image_timeout: Duration::from_secs(config.image_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })
    }

    /// The shared underlying client, for collaborators such as the search
    /// engine that issue their own requests over the same connection pool.
    #[must_use]
    pub fn http_client(&self) -> Client {
        self.client.clone()
    }

    async fn get_once(&self, url: &str, timeout: Duration) -> Result<reqwest::Response, ScraperError> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0);
            return Err(ScraperError::RateLimited {
                domain: extract_domain(url),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ScraperError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    /// Fetches a page body, retrying network failures and 429s with linear
    /// backoff.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`]: `url` does not parse (not retried).
    /// - [`ScraperError::NotFound`]: HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (not retried).
    /// - [`ScraperError::RateLimited`] / [`ScraperError::Http`]: after all retries.
    async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        reqwest::Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        retry_with_backoff(self.max_retries, self.retry_backoff_ms, || async move {
            let response = self.get_once(url, self.page_timeout).await?;
            Ok(response.text().await?)
        })
        .await
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self.get_once(url, self.image_timeout).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
