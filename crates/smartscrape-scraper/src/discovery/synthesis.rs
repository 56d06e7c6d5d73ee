//! Query vocabularies and site-search URL synthesis.
//!
//! Everything here is CPU-only: synthesized URLs are candidates, validated
//! only when the orchestrator fetches them.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Search regions visited by the engine method, in visiting order.
pub const SEARCH_REGIONS: [&str; 13] = [
    "us-en", "uk-en", "ca-en", "au-en", "de-de", "fr-fr", "es-es", "it-it", "nl-nl", "in-en",
    "jp-jp", "kr-kr", "br-pt",
];

/// Commerce terms appended to queries; the normal pass uses the first two.
pub const COMMERCE_TERMS: [&str; 7] = ["buy", "price", "shop", "store", "market", "sale", "deal"];

/// Sites padded with keyword variations when other methods underperform.
pub const POPULAR_SITES: &[&str] = &[
    "amazon.com",
    "ebay.com",
    "walmart.com",
    "aliexpress.com",
    "etsy.com",
    "target.com",
];

/// Generic keywords crossed with [`POPULAR_SITES`]; empty means the bare query.
pub const FALLBACK_KEYWORDS: &[&str] = &["", "buy", "best", "cheap", "sale"];

/// Flagship marketplaces whose country-code variants are tried by the
/// regional method.
pub const FLAGSHIP_FAMILIES: &[&str] = &["amazon", "ebay"];

const NORMAL_CATEGORY_TERMS: usize = 3;
const NORMAL_COMMERCE_TERMS: usize = 2;

/// Multilingual vocabulary for a category key; empty for unknown categories.
#[must_use]
pub fn category_terms(category: &str) -> &'static [&'static str] {
    match category.trim().to_ascii_lowercase().as_str() {
        "automotive" => &[
            "car", "auto", "vehicle", "motor", "voiture", "coche", "automobile", "wagen", "bil",
        ],
        "technology" => &["tech", "electronic", "gadget", "device", "digital", "smart"],
        "household" => &[
            "home", "house", "kitchen", "appliance", "domestic", "ménage", "casa", "haus",
        ],
        "books" => &["book", "livre", "libro", "buch", "bok", "kitab"],
        _ => &[],
    }
}

/// Curated domains for a category key; empty for unknown categories.
#[must_use]
pub fn category_domains(category: &str) -> &'static [&'static str] {
    match category.trim().to_ascii_lowercase().as_str() {
        "automotive" => &[
            "autotrader.com",
            "cars.com",
            "cargurus.com",
            "carmax.com",
            "autotrader.co.uk",
            "mobile.de",
            "autoscout24.com",
            "cardekho.com",
        ],
        "technology" => &[
            "bestbuy.com",
            "newegg.com",
            "bhphotovideo.com",
            "currys.co.uk",
            "mediamarkt.de",
            "flipkart.com",
            "amazon.com",
        ],
        "household" => &[
            "homedepot.com",
            "lowes.com",
            "wayfair.com",
            "ikea.com",
            "argos.co.uk",
            "target.com",
            "overstock.com",
        ],
        "books" => &[
            "amazon.com",
            "barnesandnoble.com",
            "waterstones.com",
            "bol.com",
            "fnac.com",
            "rakuten.com",
        ],
        _ => &[],
    }
}

/// Query variations for the engine method: the raw query, then the first
/// category terms, then the first commerce terms.
#[must_use]
pub fn query_variations(query: &str, category: &str) -> Vec<String> {
    let query = query.trim();
    std::iter::once(query.to_string())
        .chain(
            category_terms(category)
                .iter()
                .take(NORMAL_CATEGORY_TERMS)
                .map(|term| format!("{query} {term}")),
        )
        .chain(
            COMMERCE_TERMS
                .iter()
                .take(NORMAL_COMMERCE_TERMS)
                .map(|term| format!("{query} {term}")),
        )
        .collect()
}

/// The larger vocabulary used by the intensive pass: every commerce term,
/// then every category term. The raw query is not repeated.
#[must_use]
pub fn intensive_variations(query: &str, category: &str) -> Vec<String> {
    let query = query.trim();
    COMMERCE_TERMS
        .iter()
        .chain(category_terms(category))
        .map(|term| format!("{query} {term}"))
        .collect()
}

/// Builds the site-search URL for `query` on `domain`, using the domain
/// family's known search path.
#[must_use]
pub fn site_search_url(domain: &str, query: &str) -> String {
    let domain = domain.trim().trim_start_matches("www.").to_ascii_lowercase();
    let q = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC).to_string();
    let family = domain.split('.').next().unwrap_or_default();
    let path = match family {
        "amazon" => format!("/s?k={q}"),
        "ebay" => format!("/sch/i.html?_nkw={q}"),
        "target" => format!("/s?searchTerm={q}"),
        "bestbuy" => format!("/site/searchpage.jsp?st={q}"),
        "newegg" => format!("/p/pl?d={q}"),
        "aliexpress" => format!("/wholesale?SearchText={q}"),
        _ => format!("/search?q={q}"),
    };
    format!("https://www.{domain}{path}")
}

/// Registry domains belonging to a flagship family, e.g. `amazon.de`.
#[must_use]
pub fn is_flagship_variant(domain: &str) -> bool {
    domain
        .split_once('.')
        .is_some_and(|(family, _)| FLAGSHIP_FAMILIES.contains(&family))
}
