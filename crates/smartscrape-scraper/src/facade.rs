//! Single entry point combining discovery and scraping.

use std::sync::Arc;

use smartscrape_core::{ProductRecord, ScraperConfig, SearchRequest};

use crate::client::{HttpFetcher, PageFetcher};
use crate::discovery::{Discovery, DuckDuckGoEngine, SearchEngine};
use crate::error::ScraperError;
use crate::orchestrator::{enrich_image, extract_page, scrape_all, ScrapeContext};
use crate::progress::{ProgressObserver, ProgressTracker};
use crate::registry::DomainRegistry;
use crate::session::SeenUrls;

/// Product search-and-scrape engine.
///
/// Holds only immutable configuration and shared clients; every per-search
/// setting arrives in the [`SearchRequest`], so one instance can serve
/// concurrent searches.
pub struct ProductScraper {
    config: ScraperConfig,
    engine: Arc<dyn SearchEngine>,
    fetcher: Arc<dyn PageFetcher>,
    registry: Arc<DomainRegistry>,
}

impl ProductScraper {
    /// Builds a scraper with the HTTP fetcher, the DuckDuckGo engine, and the
    /// built-in domain registry.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::new(&config)?;
        let engine = DuckDuckGoEngine::new(fetcher.http_client(), config.search_timeout_secs);
        Ok(Self::with_components(
            config,
            Arc::new(engine),
            Arc::new(fetcher),
            DomainRegistry::builtin(),
        ))
    }

    /// Like [`new`](Self::new), extending the built-in registry with the JSON
    /// domain feed at `feed_url` when one is given.
    ///
    /// An unreachable or malformed feed is logged and the built-in table is
    /// used alone.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub async fn with_domain_feed(
        config: ScraperConfig,
        feed_url: Option<&str>,
    ) -> Result<Self, ScraperError> {
        let fetcher = HttpFetcher::new(&config)?;
        let client = fetcher.http_client();
        let registry = match feed_url {
            Some(url) => DomainRegistry::with_feed(&client, url, config.page_timeout_secs).await,
            None => DomainRegistry::builtin(),
        };
        let engine = DuckDuckGoEngine::new(client, config.search_timeout_secs);
        Ok(Self::with_components(
            config,
            Arc::new(engine),
            Arc::new(fetcher),
            registry,
        ))
    }

    /// Builds a scraper from explicit collaborators.
    #[must_use]
    pub fn with_components(
        config: ScraperConfig,
        engine: Arc<dyn SearchEngine>,
        fetcher: Arc<dyn PageFetcher>,
        registry: DomainRegistry,
    ) -> Self {
        Self {
            config,
            engine,
            fetcher,
            registry: Arc::new(registry),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Discovers candidates for `request` and scrapes them.
    ///
    /// Returns an empty list, never an error, when nothing is found.
    pub async fn search_and_scrape(
        &self,
        request: &SearchRequest,
        observer: Option<ProgressObserver>,
    ) -> Vec<ProductRecord> {
        let tracker = ProgressTracker::new(observer);
        self.search_and_scrape_tracked(request, &tracker).await
    }

    /// Like [`search_and_scrape`](Self::search_and_scrape), reporting into a
    /// caller-owned tracker that can be polled while the search runs.
    pub async fn search_and_scrape_tracked(
        &self,
        request: &SearchRequest,
        tracker: &ProgressTracker,
    ) -> Vec<ProductRecord> {
        tracker.reset();
        tracing::info!(
            query = %request.query,
            category = %request.category,
            max_results = request.max_results,
            "starting search"
        );

        let candidates = Discovery::new(self.engine.as_ref(), &self.registry, &self.config)
            .run(request, tracker)
            .await;
        if candidates.is_empty() {
            tracing::info!(query = %request.query, "no candidates found");
            tracker.finish_empty("No search results found");
            return Vec::new();
        }

        let workers = request
            .worker_count
            .unwrap_or(self.config.default_workers)
            .min(candidates.len());
        let seen = SeenUrls::new();
        let ctx = ScrapeContext {
            fetcher: self.fetcher.as_ref(),
            registry: &self.registry,
            config: &self.config,
            seen: &seen,
            tracker,
        };
        scrape_all(candidates, workers, ctx).await
    }

    /// Fetches and extracts one page, bypassing discovery.
    ///
    /// Returns `None` when the fetch fails. The record is returned even when
    /// no product name was found.
    pub async fn scrape_single_url(&self, url: &str) -> Option<ProductRecord> {
        let html = match self.fetcher.fetch_html(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url, error = %e, "single-page fetch failed");
                return None;
            }
        };
        let record = extract_page(html, url, &self.registry).await?;
        Some(enrich_image(self.fetcher.as_ref(), &self.config, record).await)
    }
}
