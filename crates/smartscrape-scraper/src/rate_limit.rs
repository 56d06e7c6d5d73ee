//! Pacing utilities for outbound requests.
//!
//! Provides linear backoff retry logic for transient HTTP errors such as
//! timeouts, connection resets, and 429 responses, plus the randomized
//! politeness pause taken before each page fetch. Non-retriable errors
//! (404s, other non-2xx statuses, invalid URLs) are propagated immediately.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429; the server has asked us to back off.
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout, etc.).
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    )
}

/// Executes `operation` with linear backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_step_ms * n` before
/// the n-th retry, up to `max_retries` additional attempts after the first
/// try. If all retries are exhausted the last error is returned.
///
/// # Backoff schedule (example with `backoff_step_ms = 500`)
///
/// | Attempt | Sleep before attempt |
/// |---------|----------------------|
/// | 0 (initial) | none |
/// | 1 (first retry) | 500 ms |
/// | 2 (second retry) | 1000 ms |
/// | 3 (third retry) | 1500 ms |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_step_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        attempt += 1;
        let delay_ms = backoff_step_ms.saturating_mul(u64::from(attempt));
        tracing::debug!(
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Sleeps for a random duration in `[min_ms, max_ms]`. Returns immediately
/// when `max_ms` is zero.
pub(crate) async fn polite_pause(min_ms: u64, max_ms: u64) {
    if max_ms == 0 {
        return;
    }
    let delay_ms = rand::rng().random_range(min_ms.min(max_ms)..=max_ms);
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
}
