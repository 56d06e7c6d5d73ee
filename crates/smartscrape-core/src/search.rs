use serde::{Deserialize, Serialize};

/// A candidate product-page URL produced by one discovery method.
///
/// Candidates live only for the duration of one search call. Within one
/// discovery result no two candidates share the same normalized URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultCandidate {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Region tag the candidate belongs to, e.g. `"de-de"`.
    pub region: String,
    /// Discovery method tag, e.g. `"engine"`, `"site_search"`, `"intensive"`.
    pub source: String,
}

/// Per-call search parameters passed by the caller into the facade.
///
/// Replaces mutable scraper-wide settings: every knob that may differ
/// between two searches lives here, so concurrent searches cannot race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Category key (`"technology"`, `"household"`, `"books"`,
    /// `"automotive"`, or anything else for general).
    pub category: String,
    pub max_results: usize,
    /// Restrict discovery to these region tags; `None` means all regions.
    pub region_filter: Option<Vec<String>>,
    /// Overrides the configured default worker count for this call.
    pub worker_count: Option<usize>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, category: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
            max_results,
            region_filter: None,
            worker_count: None,
        }
    }

    #[must_use]
    pub fn with_regions(mut self, regions: Vec<String>) -> Self {
        self.region_filter = if regions.is_empty() {
            None
        } else {
            Some(regions)
        };
        self
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = Some(workers);
        self
    }

    /// Returns `true` when `region` passes the request's region filter.
    #[must_use]
    pub fn allows_region(&self, region: &str) -> bool {
        self.region_filter
            .as_ref()
            .is_none_or(|regions| regions.iter().any(|r| r.eq_ignore_ascii_case(region)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_every_region_without_filter() {
        let request = SearchRequest::new("wireless mouse", "technology", 10);
        assert!(request.allows_region("us-en"));
        assert!(request.allows_region("jp-jp"));
    }

    #[test]
    fn filter_is_case_insensitive() {
        let request = SearchRequest::new("kettle", "household", 5)
            .with_regions(vec!["UK-EN".to_string()]);
        assert!(request.allows_region("uk-en"));
        assert!(!request.allows_region("us-en"));
    }

    #[test]
    fn empty_region_list_means_no_filter() {
        let request = SearchRequest::new("kettle", "household", 5).with_regions(vec![]);
        assert!(request.region_filter.is_none());
    }
}
