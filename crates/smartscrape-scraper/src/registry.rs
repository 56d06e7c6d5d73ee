//! Registry of known e-commerce domains and the region each one serves.
//!
//! Seeded from a built-in table and optionally extended at startup by a JSON
//! feed of `{ "domain": ..., "region": ... }` rows. Read-only once a search
//! starts; discovery and region tagging share one instance behind an `Arc`.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ScraperError;

/// Region tag used when neither the registry nor the TLD identifies a region.
pub const GLOBAL_REGION: &str = "global";

/// Built-in `(domain, region)` table. Region tags follow the search engine's
/// `country-language` convention so they can be passed straight through.
const BUILTIN_DOMAINS: &[(&str, &str)] = &[
    // US & international marketplaces
    ("amazon.com", "us-en"),
    ("amazon.co.uk", "uk-en"),
    ("amazon.ca", "ca-en"),
    ("amazon.de", "de-de"),
    ("amazon.fr", "fr-fr"),
    ("amazon.it", "it-it"),
    ("amazon.es", "es-es"),
    ("amazon.in", "in-en"),
    ("amazon.com.au", "au-en"),
    ("amazon.co.jp", "jp-jp"),
    ("ebay.com", "us-en"),
    ("ebay.co.uk", "uk-en"),
    ("ebay.de", "de-de"),
    ("ebay.fr", "fr-fr"),
    ("ebay.it", "it-it"),
    ("ebay.es", "es-es"),
    ("ebay.ca", "ca-en"),
    ("ebay.com.au", "au-en"),
    ("walmart.com", "us-en"),
    ("target.com", "us-en"),
    ("bestbuy.com", "us-en"),
    ("newegg.com", "us-en"),
    ("costco.com", "us-en"),
    ("homedepot.com", "us-en"),
    ("lowes.com", "us-en"),
    ("bhphotovideo.com", "us-en"),
    ("barnesandnoble.com", "us-en"),
    // European
    ("zalando.com", "de-de"),
    ("otto.de", "de-de"),
    ("cdiscount.com", "fr-fr"),
    ("fnac.com", "fr-fr"),
    ("mediamarkt.de", "de-de"),
    ("saturn.de", "de-de"),
    ("currys.co.uk", "uk-en"),
    ("argos.co.uk", "uk-en"),
    ("waterstones.com", "uk-en"),
    ("bol.com", "nl-nl"),
    ("coolblue.nl", "nl-nl"),
    ("elgiganten.dk", "dk-da"),
    ("elkjop.no", "no-no"),
    ("gigantti.fi", "fi-fi"),
    ("emag.ro", "ro-ro"),
    ("allegro.pl", "pl-pl"),
    // Asian
    ("alibaba.com", GLOBAL_REGION),
    ("aliexpress.com", GLOBAL_REGION),
    ("taobao.com", "cn-zh"),
    ("tmall.com", "cn-zh"),
    ("jd.com", "cn-zh"),
    ("rakuten.com", "us-en"),
    ("rakuten.co.jp", "jp-jp"),
    ("flipkart.com", "in-en"),
    ("myntra.com", "in-en"),
    ("snapdeal.com", "in-en"),
    ("paytmmall.com", "in-en"),
    ("shopee.com", GLOBAL_REGION),
    ("lazada.com", GLOBAL_REGION),
    ("qoo10.com", GLOBAL_REGION),
    ("gmarket.co.kr", "kr-kr"),
    ("11st.co.kr", "kr-kr"),
    ("coupang.com", "kr-kr"),
    // Others
    ("mercadolibre.com", "xl-es"),
    ("mercadolivre.com.br", "br-pt"),
    ("olx.com", GLOBAL_REGION),
    ("jumia.com", GLOBAL_REGION),
    ("konga.com", GLOBAL_REGION),
    ("takealot.com", "za-en"),
    ("etsy.com", "us-en"),
    ("overstock.com", "us-en"),
    ("wayfair.com", "us-en"),
    ("ikea.com", GLOBAL_REGION),
    ("wish.com", GLOBAL_REGION),
    ("banggood.com", GLOBAL_REGION),
    ("gearbest.com", GLOBAL_REGION),
    // Automotive
    ("autotrader.com", "us-en"),
    ("cars.com", "us-en"),
    ("cargurus.com", "us-en"),
    ("carmax.com", "us-en"),
    ("vroom.com", "us-en"),
    ("carvana.com", "us-en"),
    ("autotrader.co.uk", "uk-en"),
    ("motors.co.uk", "uk-en"),
    ("pistonheads.com", "uk-en"),
    ("mobile.de", "de-de"),
    ("autoscout24.com", "de-de"),
    ("leboncoin.fr", "fr-fr"),
    ("subito.it", "it-it"),
    ("marktplaats.nl", "nl-nl"),
    ("blocket.se", "se-sv"),
    ("finn.no", "no-no"),
    ("cardekho.com", "in-en"),
    ("carwale.com", "in-en"),
    ("zigwheels.com", "in-en"),
    ("pakwheels.com", "pk-en"),
    ("carmudi.com", GLOBAL_REGION),
];

/// Country-code TLD suffixes and the region they imply, longest first.
const TLD_REGIONS: &[(&str, &str)] = &[
    (".com.au", "au-en"),
    (".com.br", "br-pt"),
    (".com.mx", "mx-es"),
    (".co.uk", "uk-en"),
    (".co.jp", "jp-jp"),
    (".co.kr", "kr-kr"),
    (".co.in", "in-en"),
    (".co.za", "za-en"),
    (".uk", "uk-en"),
    (".ca", "ca-en"),
    (".au", "au-en"),
    (".de", "de-de"),
    (".fr", "fr-fr"),
    (".es", "es-es"),
    (".it", "it-it"),
    (".nl", "nl-nl"),
    (".in", "in-en"),
    (".jp", "jp-jp"),
    (".kr", "kr-kr"),
    (".br", "br-pt"),
    (".mx", "mx-es"),
    (".pl", "pl-pl"),
    (".ro", "ro-ro"),
    (".dk", "dk-da"),
    (".no", "no-no"),
    (".fi", "fi-fi"),
    (".se", "se-sv"),
    (".cn", "cn-zh"),
];

/// One row of the external domain feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRow {
    pub domain: String,
    pub region: String,
}

/// Known e-commerce domains in insertion order, with their region tags.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Default for DomainRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainRegistry {
    /// Registry holding only the built-in domain table.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(BUILTIN_DOMAINS.len()),
            index: HashMap::with_capacity(BUILTIN_DOMAINS.len()),
        };
        for (domain, region) in BUILTIN_DOMAINS {
            registry.insert(domain, region);
        }
        registry
    }

    /// Built-in registry extended with the rows of the JSON feed at `feed_url`.
    ///
    /// A feed that cannot be fetched or parsed is logged and ignored; the
    /// built-in table is always available.
    pub async fn with_feed(client: &reqwest::Client, feed_url: &str, timeout_secs: u64) -> Self {
        let mut registry = Self::builtin();
        match fetch_feed(client, feed_url, timeout_secs).await {
            Ok(rows) => {
                let merged = registry.merge_rows(rows);
                tracing::info!(feed_url, merged, total = registry.len(), "merged domain feed");
            }
            Err(e) => {
                tracing::warn!(
                    feed_url,
                    error = %e,
                    "domain feed unavailable, continuing with built-in domains"
                );
            }
        }
        registry
    }

    /// Merges feed rows over the current table, returning how many rows were
    /// accepted. Rows with an empty region or a domain without a dot are
    /// skipped; an existing domain takes the feed's region.
    pub fn merge_rows(&mut self, rows: impl IntoIterator<Item = FeedRow>) -> usize {
        let mut merged = 0;
        for row in rows {
            let domain = row
                .domain
                .trim()
                .trim_start_matches("www.")
                .to_ascii_lowercase();
            let region = row.region.trim().to_ascii_lowercase();
            if region.is_empty() || !domain.contains('.') || domain.contains('/') {
                tracing::debug!(domain = %row.domain, region = %row.region, "skipping invalid feed row");
                continue;
            }
            self.insert(&domain, &region);
            merged += 1;
        }
        merged
    }

    fn insert(&mut self, domain: &str, region: &str) {
        if let Some(&idx) = self.index.get(domain) {
            self.entries[idx].1 = region.to_string();
        } else {
            self.index.insert(domain.to_string(), self.entries.len());
            self.entries.push((domain.to_string(), region.to_string()));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(domain, region)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(d, r)| (d.as_str(), r.as_str()))
    }

    /// Returns the registered domain that `host` belongs to, if any.
    ///
    /// `host` matches a domain when equal to it or a subdomain of it; the
    /// longest matching domain wins, so `www.amazon.co.uk` resolves to
    /// `amazon.co.uk`, never `amazon.co`.
    #[must_use]
    pub fn matching_domain(&self, host: &str) -> Option<&str> {
        let host = host.trim().to_ascii_lowercase();
        let mut candidate = host.as_str();
        loop {
            if let Some(&idx) = self.index.get(candidate) {
                return Some(self.entries[idx].0.as_str());
            }
            let (_, rest) = candidate.split_once('.')?;
            candidate = rest;
        }
    }

    /// Returns `true` when `host` is a registered domain or one of its subdomains.
    #[must_use]
    pub fn contains_host(&self, host: &str) -> bool {
        self.matching_domain(host).is_some()
    }

    /// Region of a host: the registry entry, then the country-code TLD,
    /// then [`GLOBAL_REGION`].
    #[must_use]
    pub fn region_for_host(&self, host: &str) -> String {
        if let Some(domain) = self.matching_domain(host) {
            if let Some(&idx) = self.index.get(domain) {
                return self.entries[idx].1.clone();
            }
        }
        region_from_tld(host).unwrap_or(GLOBAL_REGION).to_string()
    }
}

/// Region implied by a host's country-code TLD, if recognized.
#[must_use]
pub fn region_from_tld(host: &str) -> Option<&'static str> {
    let host = host.trim().to_ascii_lowercase();
    TLD_REGIONS
        .iter()
        .find(|(suffix, _)| host.ends_with(suffix))
        .map(|(_, region)| *region)
}

async fn fetch_feed(
    client: &reqwest::Client,
    feed_url: &str,
    timeout_secs: u64,
) -> Result<Vec<FeedRow>, ScraperError> {
    let response = client
        .get(feed_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .timeout(Duration::from_secs(timeout_secs))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: feed_url.to_owned(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str::<Vec<FeedRow>>(&body).map_err(|e| ScraperError::Feed {
        url: feed_url.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(domain: &str, region: &str) -> FeedRow {
        FeedRow {
            domain: domain.to_string(),
            region: region.to_string(),
        }
    }

    #[test]
    fn builtin_contains_flagship_sites() {
        let registry = DomainRegistry::builtin();
        assert!(registry.contains_host("www.amazon.com"));
        assert!(registry.contains_host("flipkart.com"));
        assert!(!registry.contains_host("example.org"));
    }

    #[test]
    fn matching_domain_prefers_longest_suffix() {
        let registry = DomainRegistry::builtin();
        assert_eq!(
            registry.matching_domain("www.amazon.co.uk"),
            Some("amazon.co.uk")
        );
        assert_eq!(registry.matching_domain("smile.amazon.com"), Some("amazon.com"));
    }

    #[test]
    fn matching_domain_does_not_match_lookalike_hosts() {
        let registry = DomainRegistry::builtin();
        assert!(registry.matching_domain("notamazon.com").is_none());
    }

    #[test]
    fn region_for_registered_host() {
        let registry = DomainRegistry::builtin();
        assert_eq!(registry.region_for_host("www.otto.de"), "de-de");
        assert_eq!(registry.region_for_host("www.flipkart.com"), "in-en");
    }

    #[test]
    fn region_falls_back_to_tld_then_global() {
        let registry = DomainRegistry::builtin();
        assert_eq!(registry.region_for_host("shop.example.co.uk"), "uk-en");
        assert_eq!(registry.region_for_host("shop.example.fr"), "fr-fr");
        assert_eq!(registry.region_for_host("shop.example.com"), GLOBAL_REGION);
    }

    #[test]
    fn merge_rows_adds_and_overrides() {
        let mut registry = DomainRegistry::builtin();
        let before = registry.len();
        let merged = registry.merge_rows(vec![
            row("www.Kaufland.de", "de-de"),
            row("amazon.com", "us-en-override"),
        ]);
        assert_eq!(merged, 2);
        assert_eq!(registry.len(), before + 1);
        assert_eq!(registry.region_for_host("kaufland.de"), "de-de");
        assert_eq!(registry.region_for_host("amazon.com"), "us-en-override");
    }

    #[test]
    fn merge_rows_skips_invalid_rows() {
        let mut registry = DomainRegistry::builtin();
        let before = registry.len();
        let merged = registry.merge_rows(vec![
            row("localhost", "us-en"),
            row("shop.example.com", "  "),
            row("shop.example.com/path", "us-en"),
        ]);
        assert_eq!(merged, 0);
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn iteration_keeps_insertion_order() {
        let registry = DomainRegistry::builtin();
        let first: Vec<&str> = registry.iter().take(2).map(|(d, _)| d).collect();
        assert_eq!(first, vec!["amazon.com", "amazon.co.uk"]);
    }
}
