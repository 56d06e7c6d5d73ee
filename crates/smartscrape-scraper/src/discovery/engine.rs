//! Third-party web search used by the engine discovery method.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::ScraperError;

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHit {
    pub title: String,
    pub url: String,
    pub body: String,
}

/// A web-search capability: query plus optional region tag in, hits out.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Searches for `query`, optionally restricted to a region tag such as
    /// `"de-de"`, returning at most `max_results` hits.
    async fn search(
        &self,
        query: &str,
        region: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<EngineHit>, ScraperError>;
}

pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo's region code for "no region".
const DUCKDUCKGO_ANY_REGION: &str = "wt-wt";

static RESULT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result").expect("valid selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a").expect("valid selector"));
static SNIPPET_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.result__snippet, .result__snippet").expect("valid selector")
});

/// [`SearchEngine`] backed by DuckDuckGo's HTML endpoint.
#[derive(Debug, Clone)]
pub struct DuckDuckGoEngine {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl DuckDuckGoEngine {
    /// Uses `client` (normally shared with the page fetcher) with the search
    /// timeout, which is shorter than the page timeout.
    #[must_use]
    pub fn new(client: Client, timeout_secs: u64) -> Self {
        Self {
            client,
            endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGoEngine {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(
        &self,
        query: &str,
        region: Option<&str>,
        max_results: usize,
    ) -> Result<Vec<EngineHit>, ScraperError> {
        let region = region.unwrap_or(DUCKDUCKGO_ANY_REGION);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query), ("kl", region)])
            .header(reqwest::header::ACCEPT, "text/html")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ScraperError::RateLimited {
                domain: self.name().to_string(),
                retry_after_secs: 0,
            });
        }
        if !status.is_success() {
            return Err(ScraperError::Search {
                engine: self.name().to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body = response.text().await?;
        Ok(parse_results(&body, max_results))
    }
}

/// Parses a DuckDuckGo HTML results page. Ads, results without a title, and
/// non-HTTP links are skipped.
pub(crate) fn parse_results(html: &str, max_results: usize) -> Vec<EngineHit> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_SEL)
        .filter(|result| {
            !result
                .value()
                .classes()
                .any(|class| class == "result--ad")
        })
        .filter_map(|result| {
            let link = result.select(&LINK_SEL).next()?;
            let title = link.text().collect::<String>().trim().to_string();
            let url = unwrap_redirect(link.value().attr("href").unwrap_or_default());
            if title.is_empty() || !url.starts_with("http") {
                return None;
            }
            let body = result
                .select(&SNIPPET_SEL)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            Some(EngineHit { title, url, body })
        })
        .take(max_results)
        .collect()
}

/// Resolves `//duckduckgo.com/l/?uddg=<encoded>&rut=...` redirect links to
/// their destination; other links are returned as-is.
fn unwrap_redirect(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + "uddg=".len();
        let end = href[start..].find('&').map_or(href.len(), |i| start + i);
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded)
                .decode_utf8_lossy()
                .into_owned();
        }
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <div class="result result--ad">
          <a class="result__a" href="https://ads.example.com/x">Sponsored mouse</a>
        </div>
        <div class="result">
          <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.amazon.com%2Fdp%2FB01&amp;rut=abc">Wireless Mouse - Amazon</a>
          <a class="result__snippet">Buy the wireless mouse today.</a>
        </div>
        <div class="result">
          <a class="result__a" href="https://shop.example.org/mouse">Mouse at Example</a>
          <div class="result__snippet">Great price</div>
        </div>
        <div class="result">
          <a class="result__a" href="/relative">Relative link</a>
        </div>
    "#;

    #[test]
    fn parses_organic_results_and_unwraps_redirects() {
        let hits = parse_results(RESULTS_PAGE, 10);
        assert_eq!(
            hits,
            vec![
                EngineHit {
                    title: "Wireless Mouse - Amazon".to_string(),
                    url: "https://www.amazon.com/dp/B01".to_string(),
                    body: "Buy the wireless mouse today.".to_string(),
                },
                EngineHit {
                    title: "Mouse at Example".to_string(),
                    url: "https://shop.example.org/mouse".to_string(),
                    body: "Great price".to_string(),
                },
            ]
        );
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_results(RESULTS_PAGE, 1).len(), 1);
    }

    #[test]
    fn unwrap_redirect_passes_plain_links_through() {
        assert_eq!(
            unwrap_redirect("https://shop.example.org/a"),
            "https://shop.example.org/a"
        );
        assert_eq!(
            unwrap_redirect("//shop.example.org/a"),
            "https://shop.example.org/a"
        );
    }
}
