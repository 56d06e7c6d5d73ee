//! Shared data model and configuration for the product search-and-scrape
//! pipeline.
//!
//! This crate performs no I/O beyond reading environment variables; the
//! network-bound pipeline lives in `smartscrape-scraper`.

pub mod app_config;
pub mod config;
pub mod products;
pub mod progress;
pub mod search;

use thiserror::Error;

pub use app_config::{AppConfig, ScraperConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    Availability, ProductRecord, NO_DESCRIPTION, NO_RATING, PRICE_NOT_FOUND, PRODUCT_NAME_NOT_FOUND,
};
pub use progress::{ProgressState, ProgressStatus};
pub use search::{SearchRequest, SearchResultCandidate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
