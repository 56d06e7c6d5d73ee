//! Multi-method candidate discovery.
//!
//! Methods run in a fixed order, each with its own quota, until the target
//! count is reached. A failing method is logged and skipped. When the result
//! is still under the intensive threshold afterwards, one escalation pass
//! runs with a larger vocabulary against the whole domain registry.
//!
//! Output is deduplicated by [`url_key`] and kept in discovery order.

mod engine;
mod synthesis;

use std::collections::HashSet;

use smartscrape_core::{ScraperConfig, SearchRequest, SearchResultCandidate};

use crate::client::{extract_host, url_key};
use crate::error::ScraperError;
use crate::progress::ProgressTracker;
use crate::rate_limit::polite_pause;
use crate::registry::DomainRegistry;
use crate::relevance::RelevanceFilter;

pub use engine::{DuckDuckGoEngine, EngineHit, SearchEngine, DUCKDUCKGO_HTML_ENDPOINT};
pub use synthesis::{
    category_domains, category_terms, intensive_variations, query_variations, site_search_url,
    COMMERCE_TERMS, SEARCH_REGIONS,
};

/// Query variations sent to the engine per region in the normal pass.
const VARIATIONS_PER_REGION: usize = 2;

/// Discovery methods in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMethod {
    EngineSearch,
    CategoryDomains,
    RegionalVariants,
    SiteSynthesis,
    KeywordFallback,
    Intensive,
}

impl DiscoveryMethod {
    /// The normal pass; [`DiscoveryMethod::Intensive`] runs separately.
    ///
    /// Narrow synthesis runs before the whole-registry sweep: the category
    /// and flagship domains are registry members, so after the sweep they
    /// would only yield duplicates.
    pub const ORDERED: [Self; 5] = [
        Self::EngineSearch,
        Self::CategoryDomains,
        Self::RegionalVariants,
        Self::SiteSynthesis,
        Self::KeywordFallback,
    ];

    /// Tag stored in [`SearchResultCandidate::source`].
    #[must_use]
    pub fn source_tag(self) -> &'static str {
        match self {
            Self::EngineSearch => "engine",
            Self::SiteSynthesis => "site_search",
            Self::CategoryDomains => "category",
            Self::RegionalVariants => "regional",
            Self::KeywordFallback => "keyword_fallback",
            Self::Intensive => "intensive",
        }
    }
}

/// Accumulated unique candidates, capped at the search target.
#[derive(Debug)]
struct CandidateSet {
    items: Vec<SearchResultCandidate>,
    keys: HashSet<String>,
    target: usize,
}

impl CandidateSet {
    fn new(target: usize) -> Self {
        Self {
            items: Vec::with_capacity(target.min(256)),
            keys: HashSet::new(),
            target,
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn remaining(&self) -> usize {
        self.target.saturating_sub(self.items.len())
    }

    fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Adds `candidate` unless the set is full or its URL is already present.
    fn push(&mut self, candidate: SearchResultCandidate) -> bool {
        if self.is_full() || !self.keys.insert(url_key(&candidate.url)) {
            return false;
        }
        self.items.push(candidate);
        true
    }
}

/// One method's view of the candidate set: at most `quota` additions.
struct Budget<'s> {
    set: &'s mut CandidateSet,
    quota: usize,
    added: usize,
}

impl<'s> Budget<'s> {
    fn new(set: &'s mut CandidateSet, quota: usize) -> Self {
        Self {
            set,
            quota,
            added: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.quota
            .saturating_sub(self.added)
            .min(self.set.remaining())
    }

    fn exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn offer(&mut self, candidate: SearchResultCandidate) {
        if self.added < self.quota && self.set.push(candidate) {
            self.added += 1;
        }
    }
}

/// Number of candidates below which the intensive pass runs.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn intensive_floor(target: usize, threshold: f64) -> usize {
    ((target as f64) * threshold.clamp(0.0, 1.0)).ceil() as usize
}

/// Candidate-generation stage of a search.
pub struct Discovery<'a> {
    engine: &'a dyn SearchEngine,
    registry: &'a DomainRegistry,
    config: &'a ScraperConfig,
}

impl<'a> Discovery<'a> {
    #[must_use]
    pub fn new(
        engine: &'a dyn SearchEngine,
        registry: &'a DomainRegistry,
        config: &'a ScraperConfig,
    ) -> Self {
        Self {
            engine,
            registry,
            config,
        }
    }

    /// Discovers at most `request.max_results` unique candidates.
    ///
    /// Returns an empty list without touching the network when the query is
    /// blank or the target is zero. Never fails: method errors are logged
    /// and the next method runs.
    pub async fn run(
        &self,
        request: &SearchRequest,
        tracker: &ProgressTracker,
    ) -> Vec<SearchResultCandidate> {
        let query = request.query.trim();
        if query.is_empty() || request.max_results == 0 {
            tracing::debug!(
                max_results = request.max_results,
                "blank query or zero target, skipping discovery"
            );
            return Vec::new();
        }

        let mut set = CandidateSet::new(request.max_results);
        tracker.start_search(query, DiscoveryMethod::ORDERED.len() + 1);

        for method in DiscoveryMethod::ORDERED {
            if set.is_full() {
                tracing::debug!(method = method.source_tag(), "target reached, skipping");
                tracker.search_step(method.source_tag(), set.len());
                continue;
            }
            let quota = self.quota_for(method, set.remaining());
            let added = self.run_budgeted(method, request, &mut set, quota).await;
            tracing::info!(
                method = method.source_tag(),
                added,
                total = set.len(),
                "discovery method finished"
            );
            tracker.search_step(method.source_tag(), set.len());
        }

        let floor = intensive_floor(request.max_results, self.config.intensive_threshold);
        if set.len() < floor {
            tracing::info!(
                found = set.len(),
                floor,
                "under target, running intensive discovery"
            );
            let quota = set.remaining();
            let added = self
                .run_budgeted(DiscoveryMethod::Intensive, request, &mut set, quota)
                .await;
            tracing::info!(added, total = set.len(), "intensive discovery finished");
        }
        tracker.search_step(DiscoveryMethod::Intensive.source_tag(), set.len());

        tracker.finish_search(set.len());
        tracing::info!(query, candidates = set.len(), "discovery complete");
        set.items
    }

    fn quota_for(&self, method: DiscoveryMethod, remaining: usize) -> usize {
        if method != DiscoveryMethod::EngineSearch {
            return remaining;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let share = ((remaining as f64) * self.config.engine_quota_share).ceil() as usize;
        share.clamp(1, remaining)
    }

    async fn run_budgeted(
        &self,
        method: DiscoveryMethod,
        request: &SearchRequest,
        set: &mut CandidateSet,
        quota: usize,
    ) -> usize {
        let mut budget = Budget::new(set, quota);
        if let Err(e) = self.run_method(method, request, &mut budget).await {
            tracing::warn!(
                method = method.source_tag(),
                error = %e,
                "discovery method failed, continuing"
            );
        }
        budget.added
    }

    async fn run_method(
        &self,
        method: DiscoveryMethod,
        request: &SearchRequest,
        budget: &mut Budget<'_>,
    ) -> Result<(), ScraperError> {
        let query = request.query.trim();
        let source = method.source_tag();
        match method {
            DiscoveryMethod::EngineSearch => {
                let variations = query_variations(query, &request.category);
                let regions = self.engine_regions(request);
                self.engine_search(&variations, VARIATIONS_PER_REGION, &regions, source, budget)
                    .await
            }
            DiscoveryMethod::SiteSynthesis => {
                let pairs = self.registry.iter().map(|(d, _)| (d, query.to_string()));
                self.synthesize(request, pairs, source, budget);
                Ok(())
            }
            DiscoveryMethod::CategoryDomains => {
                let pairs = category_domains(&request.category)
                    .iter()
                    .map(|d| (*d, query.to_string()));
                self.synthesize(request, pairs, source, budget);
                Ok(())
            }
            DiscoveryMethod::RegionalVariants => {
                let pairs = self
                    .registry
                    .iter()
                    .filter(|(d, _)| synthesis::is_flagship_variant(d))
                    .map(|(d, _)| (d, query.to_string()));
                self.synthesize(request, pairs, source, budget);
                Ok(())
            }
            DiscoveryMethod::KeywordFallback => {
                let pairs = synthesis::FALLBACK_KEYWORDS.iter().flat_map(|kw| {
                    let q = if kw.is_empty() {
                        query.to_string()
                    } else {
                        format!("{query} {kw}")
                    };
                    synthesis::POPULAR_SITES
                        .iter()
                        .map(move |site| (*site, q.clone()))
                });
                self.synthesize(request, pairs, source, budget);
                Ok(())
            }
            DiscoveryMethod::Intensive => {
                self.intensive(request, budget).await;
                Ok(())
            }
        }
    }

    /// Engine regions for the normal pass: the request's filter when given,
    /// else the first `engine_regions` of [`SEARCH_REGIONS`].
    fn engine_regions(&self, request: &SearchRequest) -> Vec<Option<String>> {
        match &request.region_filter {
            Some(regions) => regions.iter().map(|r| Some(r.to_ascii_lowercase())).collect(),
            None => SEARCH_REGIONS
                .iter()
                .take(self.config.engine_regions)
                .map(|r| Some((*r).to_string()))
                .collect(),
        }
    }

    /// Queries the engine for each region × the first `per_region`
    /// variations, keeping relevant hits.
    ///
    /// Fails only when every call failed; a rate limit stops the method.
    async fn engine_search(
        &self,
        variations: &[String],
        per_region: usize,
        regions: &[Option<String>],
        source: &str,
        budget: &mut Budget<'_>,
    ) -> Result<(), ScraperError> {
        let filter = RelevanceFilter::new(self.registry, self.config.relevance_min_keywords);
        let mut last_error = None;
        let mut successful_calls = 0usize;

        'regions: for (i, region) in regions.iter().enumerate() {
            if i > 0 {
                polite_pause(self.config.delay_min_ms, self.config.delay_max_ms).await;
            }
            for variation in variations.iter().take(per_region) {
                if budget.exhausted() {
                    break 'regions;
                }
                let hits = match self
                    .engine
                    .search(variation, region.as_deref(), budget.remaining())
                    .await
                {
                    Ok(hits) => hits,
                    Err(e) => {
                        tracing::warn!(
                            engine = self.engine.name(),
                            region = region.as_deref().unwrap_or("any"),
                            query = %variation,
                            error = %e,
                            "engine search failed"
                        );
                        let rate_limited = matches!(e, ScraperError::RateLimited { .. });
                        last_error = Some(e);
                        if rate_limited {
                            break 'regions;
                        }
                        continue;
                    }
                };
                successful_calls += 1;

                for hit in hits {
                    if !filter.is_relevant(&hit.url, &hit.title, &hit.body) {
                        tracing::debug!(url = %hit.url, "dropping irrelevant engine hit");
                        continue;
                    }
                    let region = region.clone().unwrap_or_else(|| {
                        self.registry
                            .region_for_host(&extract_host(&hit.url).unwrap_or_default())
                    });
                    budget.offer(SearchResultCandidate {
                        title: hit.title,
                        url: hit.url,
                        snippet: hit.body,
                        region,
                        source: source.to_string(),
                    });
                    if budget.exhausted() {
                        break 'regions;
                    }
                }
            }
        }

        match last_error {
            Some(e) if successful_calls == 0 => Err(e),
            _ => Ok(()),
        }
    }

    /// Adds one synthesized site-search candidate per `(domain, query)` pair
    /// whose region passes the request filter.
    fn synthesize<'d>(
        &self,
        request: &SearchRequest,
        pairs: impl IntoIterator<Item = (&'d str, String)>,
        source: &str,
        budget: &mut Budget<'_>,
    ) {
        for (domain, query) in pairs {
            if budget.exhausted() {
                break;
            }
            let region = self.registry.region_for_host(domain);
            if !request.allows_region(&region) {
                continue;
            }
            budget.offer(SearchResultCandidate {
                title: format!("{query} - {domain}"),
                url: site_search_url(domain, &query),
                snippet: format!("Search results for \"{query}\" on {domain}"),
                region,
                source: source.to_string(),
            });
        }
    }

    /// Escalation pass: every commerce and category variation against the
    /// engine, then against every registered domain.
    async fn intensive(&self, request: &SearchRequest, budget: &mut Budget<'_>) {
        let source = DiscoveryMethod::Intensive.source_tag();
        let variations = intensive_variations(request.query.trim(), &request.category);
        let regions: Vec<Option<String>> = match &request.region_filter {
            Some(regions) => regions.iter().map(|r| Some(r.to_ascii_lowercase())).collect(),
            None => vec![None],
        };

        if let Err(e) = self
            .engine_search(&variations, variations.len(), &regions, source, budget)
            .await
        {
            tracing::warn!(error = %e, "intensive engine search failed, synthesizing only");
        }

        let pairs = variations
            .iter()
            .flat_map(|v| self.registry.iter().map(move |(d, _)| (d, v.clone())));
        self.synthesize(request, pairs, source, budget);
    }
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
