//! Decides whether a search hit plausibly points at a product listing.
//!
//! Deliberately permissive: poor candidates are dropped later when extraction
//! finds no product name.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::extract_host;
use crate::registry::DomainRegistry;

/// Commerce keywords counted across title, snippet, and URL.
pub const COMMERCE_KEYWORDS: [&str; 9] = [
    "buy", "price", "shop", "store", "market", "sale", "deal", "product", "item",
];

static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\$€£¥₹₽¢]|\bUSD\b|\bEUR\b|\bGBP\b|\bINR\b").expect("valid currency regex")
});

/// Relevance check bound to a domain registry and keyword threshold.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceFilter<'a> {
    registry: &'a DomainRegistry,
    min_keywords: usize,
}

impl<'a> RelevanceFilter<'a> {
    /// `min_keywords` below 1 is raised to 1.
    #[must_use]
    pub fn new(registry: &'a DomainRegistry, min_keywords: usize) -> Self {
        Self {
            registry,
            min_keywords: min_keywords.max(1),
        }
    }

    /// `true` when the URL's host contains a registered e-commerce domain, or
    /// when the commerce evidence across title, snippet, and URL reaches the
    /// keyword threshold. A currency symbol or code in the title or snippet
    /// counts as one hit.
    #[must_use]
    pub fn is_relevant(&self, url: &str, title: &str, snippet: &str) -> bool {
        if let Some(host) = extract_host(url) {
            if self.registry.iter().any(|(domain, _)| host.contains(domain)) {
                return true;
            }
        }
        keyword_hits(url, title, snippet) >= self.min_keywords
    }
}

/// Number of distinct commerce keywords present, plus one for currency evidence.
#[must_use]
pub fn keyword_hits(url: &str, title: &str, snippet: &str) -> usize {
    let haystack = format!("{title} {snippet} {url}").to_lowercase();
    let keywords = COMMERCE_KEYWORDS
        .iter()
        .filter(|kw| haystack.contains(*kw))
        .count();
    let currency = usize::from(CURRENCY_RE.is_match(&format!("{title} {snippet}")));
    keywords + currency
}
