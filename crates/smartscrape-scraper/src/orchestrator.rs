//! Bounded-concurrency fetch and extraction of discovered candidates.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use smartscrape_core::config::MAX_WORKERS;
use smartscrape_core::{ProductRecord, ScraperConfig, SearchResultCandidate};

use crate::client::PageFetcher;
use crate::error::ScraperError;
use crate::extract::{attach_candidate, extract, make_thumbnail};
use crate::progress::ProgressTracker;
use crate::rate_limit::polite_pause;
use crate::registry::DomainRegistry;
use crate::session::SeenUrls;

/// Shared, read-mostly collaborators of one scrape run.
#[derive(Clone, Copy)]
pub struct ScrapeContext<'a> {
    pub fetcher: &'a dyn PageFetcher,
    pub registry: &'a Arc<DomainRegistry>,
    pub config: &'a ScraperConfig,
    pub seen: &'a SeenUrls,
    pub tracker: &'a ProgressTracker,
}

/// Fetches and extracts every candidate with at most `workers` in flight.
///
/// Failed fetches, pages without a product name, and URLs already claimed in
/// this session are counted as failures and left out; the call itself never
/// fails. Records come back in completion order.
pub async fn scrape_all(
    candidates: Vec<SearchResultCandidate>,
    workers: usize,
    ctx: ScrapeContext<'_>,
) -> Vec<ProductRecord> {
    let total = candidates.len();
    let workers = workers.clamp(1, MAX_WORKERS);
    ctx.tracker.start_scrape(total);
    tracing::info!(total, workers, "scraping candidates");

    let results: Vec<Option<ProductRecord>> = stream::iter(candidates)
        .map(|candidate| async move {
            let outcome = scrape_candidate(ctx, &candidate).await;
            ctx.tracker.scrape_tick(outcome.is_some());
            outcome
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let records: Vec<ProductRecord> = results.into_iter().flatten().collect();
    tracing::info!(
        total,
        scraped = records.len(),
        failed = total - records.len(),
        "scraping complete"
    );
    ctx.tracker.finish_scrape(records.len());
    records
}

async fn scrape_candidate(
    ctx: ScrapeContext<'_>,
    candidate: &SearchResultCandidate,
) -> Option<ProductRecord> {
    let url = candidate.url.as_str();
    if !ctx.seen.claim(url) {
        tracing::debug!(url, "already processed in this session, skipping");
        return None;
    }

    polite_pause(ctx.config.delay_min_ms, ctx.config.delay_max_ms).await;

    let html = match ctx.fetcher.fetch_html(url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!(url, error = %e, "page fetch failed");
            return None;
        }
    };

    let record = extract_page(html, url, ctx.registry).await?;
    if !record.has_name() {
        tracing::debug!(url, "no product name on page, dropping");
        return None;
    }

    let record = enrich_image(ctx.fetcher, ctx.config, record).await;
    tracing::debug!(url, name = %record.name, "scraped product");
    Some(attach_candidate(record, candidate))
}

/// Runs CPU-bound `work` on the blocking pool so HTML parsing and image
/// decoding never stall the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, tokio::task::JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await
}

/// Parses `html` into a product record off the async runtime.
///
/// Returns `None` only when the extraction task itself panicked.
pub(crate) async fn extract_page(
    html: String,
    url: &str,
    registry: &Arc<DomainRegistry>,
) -> Option<ProductRecord> {
    let registry = Arc::clone(registry);
    let page_url = url.to_string();
    match run_blocking(move || extract(&html, &page_url, &registry)).await {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(url, error = %e, "extraction task failed");
            None
        }
    }
}

/// Attaches a JPEG thumbnail of the record's image when enabled.
///
/// Any fetch or decode failure is logged and leaves `image_data` empty.
pub async fn enrich_image(
    fetcher: &dyn PageFetcher,
    config: &ScraperConfig,
    mut record: ProductRecord,
) -> ProductRecord {
    if !config.fetch_images || record.image_url.is_empty() {
        return record;
    }

    let (max_px, quality) = (config.thumbnail_max_px, config.thumbnail_quality);
    let thumbnail = match fetcher.fetch_image(&record.image_url).await {
        Ok(bytes) => run_blocking(move || {
            make_thumbnail(&bytes, max_px, quality).map_err(|e| e.to_string())
        })
        .await
        .unwrap_or_else(|e| Err(e.to_string()))
        .map_err(|reason| ScraperError::Image {
            url: record.image_url.clone(),
            reason,
        }),
        Err(e) => Err(e),
    };

    match thumbnail {
        Ok(bytes) => record.image_data = Some(bytes),
        Err(e) => {
            tracing::debug!(url = %record.image_url, error = %e, "image enrichment skipped");
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use async_trait::async_trait;
    use smartscrape_core::ProgressStatus;

    use super::*;

    const PAGE: &str = r#"<h1>Wireless Mouse Deluxe</h1><span class="price">$19.99</span>
        <img id="landingImage" src="/img/mouse.png">"#;

    /// Serves `PAGE` for every URL except those listed in `failing`.
    struct StubFetcher {
        failing: Vec<String>,
        pages: HashMap<String, String>,
        image: Vec<u8>,
    }

    impl StubFetcher {
        fn new(failing: Vec<String>) -> Self {
            Self {
                failing,
                pages: HashMap::new(),
                image: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
            if self.failing.iter().any(|u| u == url) {
                return Err(ScraperError::UnexpectedStatus {
                    status: 500,
                    url: url.to_string(),
                });
            }
            Ok(self
                .pages
                .get(url)
                .cloned()
                .unwrap_or_else(|| PAGE.to_string()))
        }

        async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
            if self.image.is_empty() {
                return Err(ScraperError::NotFound {
                    url: url.to_string(),
                });
            }
            Ok(self.image.clone())
        }
    }

    fn candidate(n: usize) -> SearchResultCandidate {
        SearchResultCandidate {
            title: format!("Mouse {n}"),
            url: format!("https://shop.example.com/p/{n}"),
            snippet: "Buy now".to_string(),
            region: "us-en".to_string(),
            source: "engine".to_string(),
        }
    }

    fn config(fetch_images: bool) -> ScraperConfig {
        ScraperConfig {
            delay_min_ms: 0,
            delay_max_ms: 0,
            fetch_images,
            ..ScraperConfig::default()
        }
    }

    fn png() -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            300,
            150,
            image::Rgb([10, 20, 30]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn failed_candidates_are_dropped_and_counted() {
        let candidates: Vec<_> = (0..10).map(candidate).collect();
        let failing = vec![
            candidates[2].url.clone(),
            candidates[5].url.clone(),
            candidates[7].url.clone(),
        ];
        let fetcher = StubFetcher::new(failing);
        let registry = Arc::new(DomainRegistry::builtin());
        let config = config(false);
        let seen = SeenUrls::new();
        let tracker = ProgressTracker::default();
        let ctx = ScrapeContext {
            fetcher: &fetcher,
            registry: &registry,
            config: &config,
            seen: &seen,
            tracker: &tracker,
        };

        let records = scrape_all(candidates, 4, ctx).await;

        assert_eq!(records.len(), 7);
        let state = tracker.snapshot();
        assert_eq!(state.scrape_completed, 10);
        assert_eq!(state.scrape_failed, 3);
        assert_eq!(state.status, ProgressStatus::ScrapingComplete);
    }

    #[tokio::test]
    async fn pages_without_a_name_are_failures() {
        let mut fetcher = StubFetcher::new(Vec::new());
        fetcher.pages.insert(
            "https://shop.example.com/p/1".to_string(),
            "<p>Access denied</p>".to_string(),
        );
        let registry = Arc::new(DomainRegistry::builtin());
        let config = config(false);
        let seen = SeenUrls::new();
        let tracker = ProgressTracker::default();
        let ctx = ScrapeContext {
            fetcher: &fetcher,
            registry: &registry,
            config: &config,
            seen: &seen,
            tracker: &tracker,
        };

        let records = scrape_all(vec![candidate(0), candidate(1)], 2, ctx).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_url, "https://shop.example.com/p/0");
        assert_eq!(tracker.snapshot().scrape_failed, 1);
    }

    #[tokio::test]
    async fn already_seen_urls_are_not_scraped_again() {
        let fetcher = StubFetcher::new(Vec::new());
        let registry = Arc::new(DomainRegistry::builtin());
        let config = config(false);
        let seen = SeenUrls::new();
        assert!(seen.claim("https://shop.example.com/p/0"));
        let tracker = ProgressTracker::default();
        let ctx = ScrapeContext {
            fetcher: &fetcher,
            registry: &registry,
            config: &config,
            seen: &seen,
            tracker: &tracker,
        };

        let records = scrape_all(vec![candidate(0), candidate(1)], 2, ctx).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_url, "https://shop.example.com/p/1");
        assert_eq!(tracker.snapshot().scrape_completed, 2);
    }

    #[tokio::test]
    async fn records_carry_candidate_metadata_and_thumbnail() {
        let mut fetcher = StubFetcher::new(Vec::new());
        fetcher.image = png();
        let registry = Arc::new(DomainRegistry::builtin());
        let config = config(true);
        let seen = SeenUrls::new();
        let tracker = ProgressTracker::default();
        let ctx = ScrapeContext {
            fetcher: &fetcher,
            registry: &registry,
            config: &config,
            seen: &seen,
            tracker: &tracker,
        };

        let records = scrape_all(vec![candidate(3)], 1, ctx).await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Wireless Mouse Deluxe");
        assert_eq!(record.price, "$19.99");
        assert_eq!(record.search_title, "Mouse 3");
        assert_eq!(record.search_region, "us-en");
        assert_eq!(record.search_source, "engine");
        assert_eq!(record.image_url, "https://shop.example.com/img/mouse.png");
        let thumb = image::load_from_memory(record.image_data.as_deref().unwrap()).unwrap();
        assert_eq!((thumb.width(), thumb.height()), (200, 100));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_work_runs_off_the_runtime_thread() {
        let runtime_thread = std::thread::current().id();

        let worker_thread = run_blocking(|| std::thread::current().id())
            .await
            .unwrap();

        assert_ne!(worker_thread, runtime_thread);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn single_threaded_runtime_scrapes_with_thumbnails() {
        let mut fetcher = StubFetcher::new(Vec::new());
        fetcher.image = png();
        let registry = Arc::new(DomainRegistry::builtin());
        let config = config(true);
        let seen = SeenUrls::new();
        let tracker = ProgressTracker::default();
        let ctx = ScrapeContext {
            fetcher: &fetcher,
            registry: &registry,
            config: &config,
            seen: &seen,
            tracker: &tracker,
        };

        let records = scrape_all((0..4).map(candidate).collect(), 4, ctx).await;

        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.image_data.is_some()));
        assert_eq!(tracker.snapshot().scrape_failed, 0);
    }

    #[tokio::test]
    async fn extract_page_matches_inline_extraction() {
        let registry = Arc::new(DomainRegistry::builtin());
        let url = "https://shop.example.com/p/4";

        let record = extract_page(PAGE.to_string(), url, &registry).await.unwrap();

        assert_eq!(record, extract(PAGE, url, &registry));
    }

    #[tokio::test]
    async fn broken_image_leaves_record_valid() {
        let mut fetcher = StubFetcher::new(Vec::new());
        fetcher.image = b"not an image".to_vec();
        let config = config(true);
        let record = extract(PAGE, "https://shop.example.com/p/9", &DomainRegistry::builtin());

        let record = enrich_image(&fetcher, &config, record).await;

        assert!(record.image_data.is_none());
        assert!(record.has_name());
    }
}
