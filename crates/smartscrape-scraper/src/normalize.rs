//! Text-to-value heuristics for prices, stock status, and ratings.
//!
//! Everything here is pure: the extractor feeds selector text or whole-page
//! text in and gets either a normalized value or the field's sentinel back.

use std::sync::LazyLock;

use regex::Regex;
use smartscrape_core::{Availability, NO_RATING, PRICE_NOT_FOUND};

/// Currency patterns in priority order.
///
/// Earlier patterns win when several could match the same text: `R$` must
/// precede `$`, and the bare "12 dollars" form comes last.
const PRICE_PATTERNS: [&str; 18] = [
    // Brazilian Real
    r"R\$\s*\d[\d,]*(?:\.\d{1,2})?",
    // US Dollar
    r"\$\s*\d[\d,]*(?:\.\d{1,2})?",
    r"USD\s*\d[\d,]*(?:\.\d{1,2})?",
    r"\d[\d,]*(?:\.\d{1,2})?\s*USD\b",
    // Euro
    r"€\s*\d[\d,]*(?:\.\d{1,2})?",
    r"EUR\s*\d[\d,]*(?:\.\d{1,2})?",
    r"\d[\d,]*(?:\.\d{1,2})?\s*EUR\b",
    // British Pound
    r"£\s*\d[\d,]*(?:\.\d{1,2})?",
    r"GBP\s*\d[\d,]*(?:\.\d{1,2})?",
    // Indian Rupee
    r"₹\s*\d[\d,]*(?:\.\d{1,2})?",
    r"INR\s*\d[\d,]*(?:\.\d{1,2})?",
    r"\bRs\.?\s*\d[\d,]*",
    // Japanese Yen
    r"¥\s*\d[\d,]*",
    r"JPY\s*\d[\d,]*",
    // Russian Ruble
    r"₽\s*\d[\d,]*",
    // Korean Won
    r"₩\s*\d[\d,]*",
    // Spelled-out currency
    r"\d[\d,]*(?:\.\d{1,2})?\s*(?:dollars|euros|pounds|rupees|yen)\b",
    r"\d[\d,]*(?:\.\d{1,2})?\s*(?:kr|zł|lei)\b",
];

static PRICE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PRICE_PATTERNS
        .iter()
        .map(|p| Regex::new(&format!("(?i){p}")).expect("valid price regex"))
        .collect()
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static RATING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:out\s+of|/|\s)\s*(\d+)").expect("valid rating regex")
});

/// Keyword sets checked in priority order; the first set with any hit wins.
static AVAILABILITY_RES: LazyLock<[(Availability, Regex); 3]> = LazyLock::new(|| {
    [
        (
            Availability::InStock,
            Regex::new(r"\b(?:in stock|available|ready to ship)\b").expect("valid regex"),
        ),
        (
            Availability::OutOfStock,
            Regex::new(r"\b(?:out of stock|unavailable|sold out)\b").expect("valid regex"),
        ),
        (
            Availability::LimitedStock,
            Regex::new(r"\b(?:limited|few left|low stock)\b").expect("valid regex"),
        ),
    ]
});

/// Collapses every whitespace run to a single space and trims the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Finds the first price in `text`, trying currency patterns in priority
/// order over whitespace-collapsed text.
///
/// Returns the matched substring trimmed, or [`PRICE_NOT_FOUND`].
#[must_use]
pub fn extract_price(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    PRICE_RES
        .iter()
        .find_map(|re| re.find(&collapsed))
        .map_or_else(
            || PRICE_NOT_FOUND.to_string(),
            |m| m.as_str().trim().to_string(),
        )
}

/// Classifies stock status from page text.
///
/// Matching is whole-word and case-insensitive, so `"unavailable"` does not
/// count as `"available"`. Priority is in stock, then out of stock, then
/// limited stock.
#[must_use]
pub fn classify_availability(text: &str) -> Availability {
    let lower = text.to_lowercase();
    AVAILABILITY_RES
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map_or(Availability::Unknown, |(availability, _)| *availability)
}

/// Extracts a `value/scale` rating such as `"4.5 out of 5 stars"` → `"4.5/5"`.
///
/// Returns [`NO_RATING`] when no value-scale pair is present.
#[must_use]
pub fn extract_rating(text: &str) -> String {
    RATING_RE.captures(text).map_or_else(
        || NO_RATING.to_string(),
        |caps| format!("{}/{}", &caps[1], &caps[2]),
    )
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
