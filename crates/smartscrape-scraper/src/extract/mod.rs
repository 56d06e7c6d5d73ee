//! Turns a fetched product page into a [`ProductRecord`].
//!
//! Every field runs its own ordered chain of selector attempts; the first
//! acceptable value wins and an exhausted chain yields the field's sentinel.
//! Extraction never fails as a whole.
//!
//! `scraper::Html` is not `Send`, so parsing stays inside these synchronous
//! functions and never crosses an `.await` in the async callers.

mod image;
mod location;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use smartscrape_core::{
    Availability, ProductRecord, SearchResultCandidate, NO_DESCRIPTION, NO_RATING,
    PRICE_NOT_FOUND, PRODUCT_NAME_NOT_FOUND,
};

use crate::client::{absolutize_url, extract_domain};
use crate::normalize::{classify_availability, collapse_whitespace, extract_price, extract_rating};
use crate::registry::DomainRegistry;

pub use image::make_thumbnail;
pub use location::{resolve_location, INTERNATIONAL};

/// `search_region` for records not produced from a discovery candidate.
pub const UNKNOWN_SEARCH_REGION: &str = "unknown";
/// `search_source` for records scraped from a caller-supplied URL.
pub const DIRECT_SOURCE: &str = "direct";

const NAME_SELECTORS: &[&str] = &[
    r#"h1[id*="title"]"#,
    r#"h1[class*="title"]"#,
    r#"h1[class*="name"]"#,
    ".product-title h1",
    ".product-name h1",
    ".item-title h1",
    "h1",
    ".title",
    ".product-title",
    ".product-name",
    ".item-title",
    r#"[data-testid="product-title"]"#,
    r#"[data-testid="product-name"]"#,
    ".pdp-product-name",
    ".product-detail-title",
    ".listing-title",
];

const PRICE_SELECTORS: &[&str] = &[
    ".a-price-whole",
    ".a-price",
    ".price-current",
    ".price-now",
    ".product-price",
    ".current-price",
    ".sale-price",
    ".price",
    r#"[data-testid="price"]"#,
    ".notranslate",
    ".price-display",
    ".listing-price",
    ".item-price",
    ".cost",
    ".amount",
];

const RATING_SELECTORS: &[&str] = &[
    ".a-icon-alt",
    ".rating",
    ".stars",
    ".review-score",
    r#"[data-testid="rating"]"#,
    ".product-rating",
    ".star-rating",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".product-description",
    ".description",
    ".product-details",
    ".item-description",
    ".product-summary",
    ".overview",
];

const OG_IMAGE_SELECTORS: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"meta[name="og:image"]"#,
];

const IMAGE_SELECTORS: &[&str] = &[
    "#landingImage",
    ".product-image img",
    ".main-image img",
    r#"img[data-testid="product-image"]"#,
    ".product-photo img",
    ".item-image img",
    ".gallery-image img",
    ".primary-image img",
];

/// Attributes that may carry an image source, eager first then lazy-load.
const IMAGE_SRC_ATTRS: &[&str] = &["src", "data-src", "data-lazy-src", "data-old-hires"];

const DESCRIPTION_PREVIEW_CHARS: usize = 200;

fn compile(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

static NAME_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(NAME_SELECTORS));
static PRICE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(PRICE_SELECTORS));
static RATING_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(RATING_SELECTORS));
static DESCRIPTION_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| compile(DESCRIPTION_SELECTORS));
static OG_IMAGE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(OG_IMAGE_SELECTORS));
static IMAGE_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(IMAGE_SELECTORS));

static NON_WORD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\W]+$").expect("valid name regex"));

/// Extracts a [`ProductRecord`] from `html` fetched from `url`.
///
/// Search metadata is left at its direct-scrape defaults; attach a
/// candidate's metadata with [`attach_candidate`].
#[must_use]
pub fn extract(html: &str, url: &str, registry: &DomainRegistry) -> ProductRecord {
    let document = Html::parse_document(html);
    let page_text = visible_text(&document);
    let domain = extract_domain(url);

    let name = extract_name(&document);
    if name == PRODUCT_NAME_NOT_FOUND {
        tracing::debug!(url, "no product name selector matched");
    }

    ProductRecord {
        name,
        price: extract_page_price(&document, &page_text),
        location: resolve_location(&domain, &page_text),
        product_url: url.to_string(),
        image_url: extract_image_url(&document, url).unwrap_or_default(),
        image_data: None,
        availability: extract_availability(&page_text),
        rating: extract_page_rating(&document),
        description: extract_description(&document),
        region: registry.region_for_host(&domain),
        domain,
        search_title: String::new(),
        search_snippet: String::new(),
        search_region: UNKNOWN_SEARCH_REGION.to_string(),
        search_source: DIRECT_SOURCE.to_string(),
    }
}

/// Copies a discovery candidate's title, snippet, region, and source onto
/// the record.
#[must_use]
pub fn attach_candidate(mut record: ProductRecord, candidate: &SearchResultCandidate) -> ProductRecord {
    record.search_title.clone_from(&candidate.title);
    record.search_snippet.clone_from(&candidate.snippet);
    record.search_region = if candidate.region.is_empty() {
        UNKNOWN_SEARCH_REGION.to_string()
    } else {
        candidate.region.clone()
    };
    record.search_source.clone_from(&candidate.source);
    record
}

/// Text of every text node outside `<script>`, `<style>`, and `<noscript>`,
/// whitespace-collapsed.
fn visible_text(document: &Html) -> String {
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    collapse_whitespace(&out)
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// First element matched by each selector, in selector order.
fn first_matches<'a>(
    document: &'a Html,
    selectors: &'a [Selector],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    selectors
        .iter()
        .filter_map(move |sel| document.select(sel).next())
}

fn is_acceptable_name(name: &str) -> bool {
    let len = name.chars().count();
    (6..200).contains(&len) && !NON_WORD_NAME_RE.is_match(name)
}

fn extract_name(document: &Html) -> String {
    first_matches(document, &NAME_SELS)
        .map(element_text)
        .find(|name| is_acceptable_name(name))
        .unwrap_or_else(|| PRODUCT_NAME_NOT_FOUND.to_string())
}

fn extract_page_price(document: &Html, page_text: &str) -> String {
    first_matches(document, &PRICE_SELS)
        .map(|el| extract_price(&element_text(el)))
        .find(|price| price != PRICE_NOT_FOUND)
        .unwrap_or_else(|| extract_price(page_text))
}

fn extract_availability(page_text: &str) -> Availability {
    classify_availability(page_text)
}

fn extract_page_rating(document: &Html) -> String {
    first_matches(document, &RATING_SELS)
        .find_map(|el| {
            let sources = [
                Some(element_text(el)),
                el.value().attr("alt").map(str::to_string),
                el.value().attr("title").map(str::to_string),
            ];
            sources
                .into_iter()
                .flatten()
                .map(|text| extract_rating(&text))
                .find(|rating| rating != NO_RATING)
        })
        .unwrap_or_else(|| NO_RATING.to_string())
}

fn extract_description(document: &Html) -> String {
    first_matches(document, &DESCRIPTION_SELS)
        .map(element_text)
        .find(|desc| {
            let len = desc.chars().count();
            len > 10 && len < 500
        })
        .map_or_else(|| NO_DESCRIPTION.to_string(), |desc| preview(&desc))
}

fn preview(text: &str) -> String {
    if text.chars().count() > DESCRIPTION_PREVIEW_CHARS {
        let cut: String = text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

fn is_usable_image_src(src: &str) -> bool {
    let src = src.trim();
    !src.is_empty()
        && !src.starts_with("data:")
        && !src.to_ascii_lowercase().contains("placeholder")
}

fn extract_image_url(document: &Html, base_url: &str) -> Option<String> {
    let og_image = first_matches(document, &OG_IMAGE_SELS)
        .filter_map(|el| el.value().attr("content"))
        .find(|src| is_usable_image_src(src));

    let selected = || {
        first_matches(document, &IMAGE_SELS).find_map(|el| {
            IMAGE_SRC_ATTRS
                .iter()
                .filter_map(|attr| el.value().attr(attr))
                .find(|src| is_usable_image_src(src))
        })
    };

    og_image
        .or_else(selected)
        .and_then(|src| absolutize_url(base_url, src))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
