//! Product discovery and scraping.
//!
//! [`ProductScraper`] turns a [`smartscrape_core::SearchRequest`] into
//! [`smartscrape_core::ProductRecord`]s: [`discovery`] gathers candidate
//! URLs from the search engine and synthesized site searches, then the
//! [`orchestrator`] fetches and extracts them with bounded concurrency.

mod client;
pub mod discovery;
mod error;
pub mod export;
pub mod extract;
mod facade;
pub mod normalize;
pub mod orchestrator;
pub mod progress;
mod rate_limit;
pub mod registry;
pub mod relevance;
pub mod session;

pub use client::{extract_host, url_key, HttpFetcher, PageFetcher};
pub use discovery::{DuckDuckGoEngine, EngineHit, SearchEngine};
pub use error::ScraperError;
pub use export::{read_csv, write_csv};
pub use facade::ProductScraper;
pub use orchestrator::{scrape_all, ScrapeContext};
pub use progress::{ProgressObserver, ProgressTracker};
pub use registry::DomainRegistry;
pub use session::SeenUrls;
