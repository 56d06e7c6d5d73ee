use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name used when no selector produced an acceptable product title.
pub const PRODUCT_NAME_NOT_FOUND: &str = "Product name not found";
/// Price used when neither price selectors nor the page text yield a price.
pub const PRICE_NOT_FOUND: &str = "Price not found";
/// Rating used when no `value/scale` pattern is found.
pub const NO_RATING: &str = "No rating";
/// Description used when no description selector yields usable text.
pub const NO_DESCRIPTION: &str = "No description available";

/// Stock status classified from a product page's visible text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Limited Stock")]
    LimitedStock,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Availability {
    /// Human-readable label, also used as the exported cell value.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::OutOfStock => "Out of Stock",
            Availability::LimitedStock => "Limited Stock",
            Availability::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Availability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "In Stock" => Ok(Availability::InStock),
            "Out of Stock" => Ok(Availability::OutOfStock),
            "Limited Stock" => Ok(Availability::LimitedStock),
            "Unknown" => Ok(Availability::Unknown),
            other => Err(format!("unknown availability label \"{other}\"")),
        }
    }
}

/// A normalized product extracted from one fetched page.
///
/// Every string field is always populated: fields the extractor could not
/// find carry the documented sentinel (see the `*_NOT_FOUND` / `NO_*`
/// constants) rather than being empty or absent. The only optional field is
/// `image_data`, which holds a JPEG thumbnail when image enrichment succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Price exactly as matched on the page, e.g. `"$24.99"` or `"Rs. 1,499"`.
    pub price: String,
    /// Country or free-text seller location; `"International"` when unknown.
    pub location: String,
    pub product_url: String,
    /// Absolute image URL, or an empty string when none was found.
    pub image_url: String,
    #[serde(default)]
    pub image_data: Option<Vec<u8>>,
    pub availability: Availability,
    /// `"X/Y"`, e.g. `"4.5/5"`, or [`NO_RATING`].
    pub rating: String,
    pub description: String,
    /// Host of `product_url`, e.g. `"www.amazon.co.uk"`.
    pub domain: String,
    /// Region tag derived from the domain, e.g. `"uk-en"`; `"global"` when unknown.
    pub region: String,
    pub search_title: String,
    pub search_snippet: String,
    /// Region the candidate was discovered in; `"unknown"` when not recorded.
    pub search_region: String,
    /// Discovery method that produced the candidate, e.g. `"engine"`.
    pub search_source: String,
}

impl ProductRecord {
    /// Returns `true` when the extractor found a usable product name.
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.name != PRODUCT_NAME_NOT_FOUND
    }

    /// Returns `true` when a price was found on the page.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price != PRICE_NOT_FOUND
    }

    /// Returns `true` when a `value/scale` rating was found.
    #[must_use]
    pub fn has_rating(&self) -> bool {
        self.rating != NO_RATING
    }
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
