/// Default desktop browser user agent sent with page fetches.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Immutable scraper settings shared by every search made through one
/// scraper instance.
///
/// Per-call knobs (result count, region filter, worker override) live in
/// [`crate::SearchRequest`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    pub user_agent: String,
    /// Timeout for product page fetches.
    pub page_timeout_secs: u64,
    /// Timeout for search-engine requests; always shorter than the page timeout.
    pub search_timeout_secs: u64,
    /// Timeout for thumbnail image fetches.
    pub image_timeout_secs: u64,
    /// Worker count used when a request does not override it.
    pub default_workers: usize,
    /// Additional attempts after the first failed page fetch.
    pub max_retries: u32,
    /// Linear backoff step: the n-th retry waits `n * retry_backoff_ms`.
    pub retry_backoff_ms: u64,
    /// Politeness jitter range slept before every page fetch.
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    /// Commerce keyword hits needed for a non-allow-listed URL to be relevant.
    pub relevance_min_keywords: usize,
    /// Discovery escalates to intensive mode below `target * intensive_threshold`.
    pub intensive_threshold: f64,
    /// Fraction of the target the engine-backed method may fill on its own.
    pub engine_quota_share: f64,
    /// Number of search regions the engine-backed method visits.
    pub engine_regions: usize,
    pub fetch_images: bool,
    /// Thumbnails are downscaled to fit a square of this edge length.
    pub thumbnail_max_px: u32,
    /// JPEG quality (1-100) used when re-encoding thumbnails.
    pub thumbnail_quality: u8,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 15,
            search_timeout_secs: 8,
            image_timeout_secs: 5,
            default_workers: 5,
            max_retries: 2,
            retry_backoff_ms: 500,
            delay_min_ms: 500,
            delay_max_ms: 2000,
            relevance_min_keywords: 1,
            intensive_threshold: 0.8,
            engine_quota_share: 1.0,
            engine_regions: 6,
            fetch_images: true,
            thumbnail_max_px: 200,
            thumbnail_quality: 85,
        }
    }
}

/// Process-level configuration loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    /// Optional JSON feed of `{domain, region}` rows merged into the
    /// built-in domain registry.
    pub domain_feed_url: Option<String>,
    pub scraper: ScraperConfig,
}
