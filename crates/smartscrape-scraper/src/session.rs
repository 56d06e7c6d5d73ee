use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use crate::client::url_key;

/// URLs already handed to a scrape worker during one search call.
///
/// Keys are [`url_key`]s, so scheme, `www.` and trailing-slash variants of
/// one page count as the same URL. Shared by every worker of the search.
#[derive(Debug, Default)]
pub struct SeenUrls {
    keys: Mutex<HashSet<String>>,
}

impl SeenUrls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for processing. Returns `false` when it was already
    /// claimed earlier in this session.
    pub fn claim(&self, url: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url_key(url))
    }

    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&url_key(url))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
