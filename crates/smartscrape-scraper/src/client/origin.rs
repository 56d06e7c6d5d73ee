//! URL host extraction, canonical keys, and relative-URL resolution.

use reqwest::Url;

/// Extracts the lowercase hostname from a URL.
///
/// Returns `None` when the URL cannot be parsed or has no host.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// Extracts the hostname for use in error messages and logs.
///
/// Falls back to the full URL string if parsing fails.
pub(crate) fn extract_domain(url: &str) -> String {
    extract_host(url).unwrap_or_else(|| url.to_owned())
}

/// Builds the deduplication key for a URL.
///
/// Scheme, a leading `www.`, the fragment, and a trailing slash are dropped
/// and the host is lowercased, so `http://WWW.Shop.com/item/` and
/// `https://shop.com/item` share one key. The path and query keep their case.
#[must_use]
pub fn url_key(url: &str) -> String {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return url.trim().trim_end_matches('/').to_ascii_lowercase();
    };
    let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = parsed.path().trim_end_matches('/');
    let query = parsed.query().map(|q| format!("?{q}")).unwrap_or_default();
    format!("{host}{port}{path}{query}")
}

/// Resolves `candidate` against `base_url`, unescaping `&amp;` first.
///
/// Returns `None` when either URL is unusable.
pub(crate) fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.trim().replace("&amp;", "&");
    if candidate.is_empty() {
        return None;
    }
    let base = Url::parse(base_url).ok()?;
    base.join(&candidate).ok().map(|u| u.to_string())
}
