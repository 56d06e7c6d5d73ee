//! Flat record-set export of scraped products.
//!
//! One CSV row per [`ProductRecord`], one column per field. Thumbnail bytes
//! are hex-encoded (empty cell when absent) and availability is written as
//! its display label, so a write/read cycle reproduces every value,
//! sentinels included.

use std::fmt::Write as _;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use smartscrape_core::{Availability, ProductRecord};

use crate::error::ScraperError;

#[derive(Debug, Serialize, Deserialize)]
struct ProductRow {
    name: String,
    price: String,
    location: String,
    product_url: String,
    image_url: String,
    image_data: String,
    availability: String,
    rating: String,
    description: String,
    domain: String,
    region: String,
    search_title: String,
    search_snippet: String,
    search_region: String,
    search_source: String,
}

impl From<&ProductRecord> for ProductRow {
    fn from(record: &ProductRecord) -> Self {
        Self {
            name: record.name.clone(),
            price: record.price.clone(),
            location: record.location.clone(),
            product_url: record.product_url.clone(),
            image_url: record.image_url.clone(),
            image_data: record
                .image_data
                .as_deref()
                .map(encode_hex)
                .unwrap_or_default(),
            availability: record.availability.label().to_string(),
            rating: record.rating.clone(),
            description: record.description.clone(),
            domain: record.domain.clone(),
            region: record.region.clone(),
            search_title: record.search_title.clone(),
            search_snippet: record.search_snippet.clone(),
            search_region: record.search_region.clone(),
            search_source: record.search_source.clone(),
        }
    }
}

impl ProductRow {
    fn into_record(self, line: u64) -> Result<ProductRecord, ScraperError> {
        let availability = self
            .availability
            .parse::<Availability>()
            .map_err(|reason| ScraperError::MalformedRecord { line, reason })?;
        let image_data = if self.image_data.is_empty() {
            None
        } else {
            Some(decode_hex(&self.image_data).map_err(|reason| {
                ScraperError::MalformedRecord { line, reason }
            })?)
        };
        Ok(ProductRecord {
            name: self.name,
            price: self.price,
            location: self.location,
            product_url: self.product_url,
            image_url: self.image_url,
            image_data,
            availability,
            rating: self.rating,
            description: self.description,
            domain: self.domain,
            region: self.region,
            search_title: self.search_title,
            search_snippet: self.search_snippet,
            search_region: self.search_region,
            search_source: self.search_source,
        })
    }
}

/// Writes `records` with a header row.
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] when serialization or the writer fails.
pub fn write_csv<W: Write>(records: &[ProductRecord], writer: W) -> Result<(), ScraperError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(ProductRow::from(record))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Reads records written by [`write_csv`].
///
/// # Errors
///
/// Returns [`ScraperError::Csv`] for unreadable CSV and
/// [`ScraperError::MalformedRecord`] for an unknown availability label or
/// invalid hex image data.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ProductRecord>, ScraperError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<ProductRow>().enumerate() {
        // Line 1 is the header.
        let line = u64::try_from(index).map_or(u64::MAX, |i| i + 2);
        records.push(row?.into_record(line)?);
    }
    Ok(records)
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn decode_hex(text: &str) -> Result<Vec<u8>, String> {
    if text.len() % 2 != 0 {
        return Err(format!("odd-length hex image data ({} chars)", text.len()));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {i}"))
        })
        .collect()
}
