mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "smartscrape")]
#[command(about = "Search the web for products and scrape their pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover product pages for a query and scrape them.
    Search {
        query: String,
        /// Category vocabulary used to enrich the query
        /// (automotive, technology, household, books, general).
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long, default_value_t = 20)]
        max_results: usize,
        /// Parallel page fetches; defaults to `SMARTSCRAPE_WORKERS`.
        #[arg(long)]
        workers: Option<usize>,
        /// Restrict discovery to these region tags (e.g. `de-de`). Repeatable.
        #[arg(long = "region")]
        regions: Vec<String>,
        /// Also write the records to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Scrape a single product page without searching.
    Scrape { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = smartscrape_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let scraper = smartscrape_scraper::ProductScraper::with_domain_feed(
        config.scraper.clone(),
        config.domain_feed_url.as_deref(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("failed to build scraper: {e}"))?;

    match cli.command {
        Commands::Search {
            query,
            category,
            max_results,
            workers,
            regions,
            csv,
        } => {
            let options = commands::SearchOptions {
                category,
                max_results,
                workers,
                regions,
                csv,
            };
            commands::run_search(&scraper, &query, options).await?;
        }
        Commands::Scrape { url } => commands::run_scrape(&scraper, &url).await?,
    }

    Ok(())
}
