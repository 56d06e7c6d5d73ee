use crate::app_config::{AppConfig, ScraperConfig};
use crate::ConfigError;

/// Upper bound on parallel page fetches; beyond this the scraper stops being
/// polite to target sites.
pub const MAX_WORKERS: usize = 32;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; missing ones take the [`ScraperConfig`]
/// defaults. Lookup is injected so tests can use a plain `HashMap`.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = ScraperConfig::default();

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_f64 = |var: &str, default: f64| -> Result<f64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<f64>().map_err(|e| invalid(var, e.to_string())),
            Err(_) => Ok(default),
        }
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => parse_bool_value(&raw).ok_or_else(|| {
                invalid(var, format!("expected true/false, got \"{}\"", raw.trim()))
            }),
            Err(_) => Ok(default),
        }
    };

    let log_level = lookup("SMARTSCRAPE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let domain_feed_url = lookup("SMARTSCRAPE_DOMAIN_FEED_URL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let user_agent = lookup("SMARTSCRAPE_USER_AGENT").unwrap_or(defaults.user_agent);

    let page_timeout_secs = parse_u64("SMARTSCRAPE_PAGE_TIMEOUT_SECS", defaults.page_timeout_secs)?;
    let search_timeout_secs =
        parse_u64("SMARTSCRAPE_SEARCH_TIMEOUT_SECS", defaults.search_timeout_secs)?;
    let image_timeout_secs =
        parse_u64("SMARTSCRAPE_IMAGE_TIMEOUT_SECS", defaults.image_timeout_secs)?;
    if search_timeout_secs == 0 || search_timeout_secs >= page_timeout_secs {
        return Err(invalid(
            "SMARTSCRAPE_SEARCH_TIMEOUT_SECS",
            format!(
                "must be non-zero and shorter than the page timeout ({page_timeout_secs}s), got {search_timeout_secs}s"
            ),
        ));
    }

    let default_workers = parse_usize("SMARTSCRAPE_WORKERS", defaults.default_workers)?;
    if default_workers == 0 || default_workers > MAX_WORKERS {
        return Err(invalid(
            "SMARTSCRAPE_WORKERS",
            format!("must be between 1 and {MAX_WORKERS}, got {default_workers}"),
        ));
    }

    let max_retries = match lookup("SMARTSCRAPE_MAX_RETRIES") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid("SMARTSCRAPE_MAX_RETRIES", e.to_string()))?,
        Err(_) => defaults.max_retries,
    };
    let retry_backoff_ms = parse_u64("SMARTSCRAPE_RETRY_BACKOFF_MS", defaults.retry_backoff_ms)?;

    let delay_min_ms = parse_u64("SMARTSCRAPE_DELAY_MIN_MS", defaults.delay_min_ms)?;
    let delay_max_ms = parse_u64("SMARTSCRAPE_DELAY_MAX_MS", defaults.delay_max_ms)?;
    if delay_min_ms > delay_max_ms {
        return Err(invalid(
            "SMARTSCRAPE_DELAY_MIN_MS",
            format!("{delay_min_ms}ms exceeds SMARTSCRAPE_DELAY_MAX_MS ({delay_max_ms}ms)"),
        ));
    }

    let relevance_min_keywords = parse_usize(
        "SMARTSCRAPE_RELEVANCE_MIN_KEYWORDS",
        defaults.relevance_min_keywords,
    )?
    .max(1);

    let intensive_threshold =
        parse_f64("SMARTSCRAPE_INTENSIVE_THRESHOLD", defaults.intensive_threshold)?;
    if !(0.0..=1.0).contains(&intensive_threshold) {
        return Err(invalid(
            "SMARTSCRAPE_INTENSIVE_THRESHOLD",
            format!("must be within [0, 1], got {intensive_threshold}"),
        ));
    }

    let engine_quota_share =
        parse_f64("SMARTSCRAPE_ENGINE_QUOTA_SHARE", defaults.engine_quota_share)?;
    if !(engine_quota_share > 0.0 && engine_quota_share <= 1.0) {
        return Err(invalid(
            "SMARTSCRAPE_ENGINE_QUOTA_SHARE",
            format!("must be within (0, 1], got {engine_quota_share}"),
        ));
    }

    let engine_regions = parse_usize("SMARTSCRAPE_ENGINE_REGIONS", defaults.engine_regions)?;
    let fetch_images = parse_bool("SMARTSCRAPE_FETCH_IMAGES", defaults.fetch_images)?;

    let thumbnail_max_px = match lookup("SMARTSCRAPE_THUMBNAIL_MAX_PX") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid("SMARTSCRAPE_THUMBNAIL_MAX_PX", e.to_string()))?,
        Err(_) => defaults.thumbnail_max_px,
    };
    if thumbnail_max_px == 0 {
        return Err(invalid(
            "SMARTSCRAPE_THUMBNAIL_MAX_PX",
            "must be greater than zero".to_string(),
        ));
    }

    let thumbnail_quality = match lookup("SMARTSCRAPE_THUMBNAIL_QUALITY") {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .map_err(|e| invalid("SMARTSCRAPE_THUMBNAIL_QUALITY", e.to_string()))?,
        Err(_) => defaults.thumbnail_quality,
    };
    if !(1..=100).contains(&thumbnail_quality) {
        return Err(invalid(
            "SMARTSCRAPE_THUMBNAIL_QUALITY",
            format!("must be between 1 and 100, got {thumbnail_quality}"),
        ));
    }

    Ok(AppConfig {
        log_level,
        domain_feed_url,
        scraper: ScraperConfig {
            user_agent,
            page_timeout_secs,
            search_timeout_secs,
            image_timeout_secs,
            default_workers,
            max_retries,
            retry_backoff_ms,
            delay_min_ms,
            delay_max_ms,
            relevance_min_keywords,
            intensive_threshold,
            engine_quota_share,
            engine_regions,
            fetch_images,
            thumbnail_max_px,
            thumbnail_quality,
        },
    })
}

fn parse_bool_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
