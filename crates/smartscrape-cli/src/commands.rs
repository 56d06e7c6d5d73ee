//! Command handlers for the CLI.
//!
//! Results go to stdout as plain tables; progress and diagnostics go to the
//! tracing subscriber on stderr.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use smartscrape_core::{ProductRecord, ProgressState, SearchRequest};
use smartscrape_scraper::{write_csv, ProductScraper, ProgressObserver};

/// Options of the `search` subcommand beyond the query itself.
#[derive(Debug, Clone)]
pub(crate) struct SearchOptions {
    pub category: String,
    pub max_results: usize,
    pub workers: Option<usize>,
    pub regions: Vec<String>,
    pub csv: Option<PathBuf>,
}

/// Runs a search, prints the records, and optionally exports them.
///
/// # Errors
///
/// Returns an error only when the CSV file cannot be created or written;
/// an empty result set is reported on stdout, not as an error.
pub(crate) async fn run_search(
    scraper: &ProductScraper,
    query: &str,
    options: SearchOptions,
) -> anyhow::Result<()> {
    let request = build_request(query, &options);
    let records = scraper
        .search_and_scrape(&request, Some(logging_observer()))
        .await;

    if records.is_empty() {
        println!("no products found for '{query}'");
        return Ok(());
    }

    print_records(&records);

    if let Some(path) = &options.csv {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_csv(&records, BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} records to {}", records.len(), path.display());
    }

    Ok(())
}

/// Scrapes one URL and prints every extracted field.
///
/// # Errors
///
/// Returns an error when the page cannot be fetched.
pub(crate) async fn run_scrape(scraper: &ProductScraper, url: &str) -> anyhow::Result<()> {
    let record = scraper
        .scrape_single_url(url)
        .await
        .ok_or_else(|| anyhow::anyhow!("could not fetch {url}"))?;

    println!("Name:         {}", record.name);
    println!("Price:        {}", record.price);
    println!("Availability: {}", record.availability);
    println!("Rating:       {}", record.rating);
    println!("Location:     {}", record.location);
    println!("Domain:       {} ({})", record.domain, record.region);
    println!("Image:        {}", display_or_dash(&record.image_url));
    if let Some(bytes) = &record.image_data {
        println!("Thumbnail:    {} bytes", bytes.len());
    }
    println!("Description:  {}", record.description);
    Ok(())
}

pub(crate) fn build_request(query: &str, options: &SearchOptions) -> SearchRequest {
    let mut request = SearchRequest::new(query, options.category.as_str(), options.max_results)
        .with_regions(options.regions.clone());
    if let Some(workers) = options.workers {
        request = request.with_workers(workers);
    }
    request
}

fn logging_observer() -> ProgressObserver {
    Arc::new(|state: &ProgressState| {
        tracing::info!(
            status = ?state.status,
            search = %format!("{}/{}", state.search_completed, state.search_total),
            scrape = %format!("{}/{}", state.scrape_completed, state.scrape_total),
            failed = state.scrape_failed,
            "{}",
            state.message
        );
    })
}

fn print_records(records: &[ProductRecord]) {
    println!(
        "{:<42}{:<14}{:<10}{:<15}{:<24}URL",
        "NAME", "PRICE", "RATING", "AVAILABILITY", "DOMAIN"
    );
    for record in records {
        println!(
            "{:<42}{:<14}{:<10}{:<15}{:<24}{}",
            truncate(&record.name, 40),
            truncate(&record.price, 12),
            truncate(&record.rating, 8),
            record.availability.label(),
            truncate(&record.domain, 22),
            record.product_url
        );
    }
    println!();
    println!("{} products", records.len());
}

/// Shortens `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn display_or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}
