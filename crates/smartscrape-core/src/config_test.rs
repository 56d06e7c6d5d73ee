use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn assert_invalid(map: &HashMap<&str, &str>, expected_var: &str) {
    let result = build_app_config(lookup_from_map(map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.domain_feed_url.is_none());
    assert_eq!(cfg.scraper, ScraperConfig::default());
    assert_eq!(cfg.scraper.page_timeout_secs, 15);
    assert_eq!(cfg.scraper.search_timeout_secs, 8);
    assert_eq!(cfg.scraper.default_workers, 5);
    assert_eq!(cfg.scraper.relevance_min_keywords, 1);
    assert!((cfg.scraper.intensive_threshold - 0.8).abs() < f64::EPSILON);
}

#[test]
fn workers_override() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_WORKERS", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scraper.default_workers, 8);
}

#[test]
fn workers_zero_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_WORKERS", "0");
    assert_invalid(&map, "SMARTSCRAPE_WORKERS");
}

#[test]
fn workers_above_limit_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_WORKERS", "64");
    assert_invalid(&map, "SMARTSCRAPE_WORKERS");
}

#[test]
fn workers_not_a_number_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_WORKERS", "many");
    assert_invalid(&map, "SMARTSCRAPE_WORKERS");
}

#[test]
fn search_timeout_must_be_shorter_than_page_timeout() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_PAGE_TIMEOUT_SECS", "10");
    map.insert("SMARTSCRAPE_SEARCH_TIMEOUT_SECS", "10");
    assert_invalid(&map, "SMARTSCRAPE_SEARCH_TIMEOUT_SECS");
}

#[test]
fn delay_range_must_be_ordered() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_DELAY_MIN_MS", "3000");
    map.insert("SMARTSCRAPE_DELAY_MAX_MS", "1000");
    assert_invalid(&map, "SMARTSCRAPE_DELAY_MIN_MS");
}

#[test]
fn relevance_threshold_is_clamped_to_one() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_RELEVANCE_MIN_KEYWORDS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.scraper.relevance_min_keywords, 1);
}

#[test]
fn intensive_threshold_out_of_range_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_INTENSIVE_THRESHOLD", "1.5");
    assert_invalid(&map, "SMARTSCRAPE_INTENSIVE_THRESHOLD");
}

#[test]
fn engine_quota_share_zero_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_ENGINE_QUOTA_SHARE", "0");
    assert_invalid(&map, "SMARTSCRAPE_ENGINE_QUOTA_SHARE");
}

#[test]
fn fetch_images_accepts_common_spellings() {
    for (raw, expected) in [("false", false), ("0", false), ("YES", true), ("on", true)] {
        let mut map = HashMap::new();
        map.insert("SMARTSCRAPE_FETCH_IMAGES", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.scraper.fetch_images, expected, "input {raw}");
    }
}

#[test]
fn fetch_images_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_FETCH_IMAGES", "maybe");
    assert_invalid(&map, "SMARTSCRAPE_FETCH_IMAGES");
}

#[test]
fn thumbnail_quality_out_of_range_is_invalid() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_THUMBNAIL_QUALITY", "0");
    assert_invalid(&map, "SMARTSCRAPE_THUMBNAIL_QUALITY");
}

#[test]
fn blank_domain_feed_url_is_ignored() {
    let mut map = HashMap::new();
    map.insert("SMARTSCRAPE_DOMAIN_FEED_URL", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.domain_feed_url.is_none());
}

#[test]
fn domain_feed_url_override() {
    let mut map = HashMap::new();
    map.insert(
        "SMARTSCRAPE_DOMAIN_FEED_URL",
        "https://data.example.com/domains.json",
    );
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.domain_feed_url.as_deref(),
        Some("https://data.example.com/domains.json")
    );
}
