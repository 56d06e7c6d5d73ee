use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("search engine {engine} failed: {reason}")]
    Search { engine: String, reason: String },

    #[error("image enrichment failed for {url}: {reason}")]
    Image { url: String, reason: String },

    #[error("domain feed {url} unusable: {reason}")]
    Feed { url: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },
}
