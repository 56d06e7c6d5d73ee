//! Mutex-guarded progress aggregate for one search call.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use smartscrape_core::{ProgressState, ProgressStatus};

/// Callback receiving a snapshot after every progress update.
///
/// Invoked synchronously on the updating task, after the lock is released.
pub type ProgressObserver = Arc<dyn Fn(&ProgressState) + Send + Sync>;

/// Owns the live [`ProgressState`] of one search.
///
/// Discovery and every scrape worker update it through `&self`; callers may
/// read a [`snapshot`](Self::snapshot) at any time.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    observer: Option<ProgressObserver>,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("state", &self.snapshot())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ProgressTracker {
    #[must_use]
    pub fn new(observer: Option<ProgressObserver>) -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            observer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProgressState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressState {
        self.lock().clone()
    }

    fn update(&self, apply: impl FnOnce(&mut ProgressState)) {
        let snapshot = {
            let mut state = self.lock();
            apply(&mut state);
            state.updated_at = Some(Utc::now());
            state.clone()
        };
        if let Some(observer) = &self.observer {
            observer(&snapshot);
        }
    }

    /// Clears all counters back to idle.
    pub fn reset(&self) {
        self.update(|state| *state = ProgressState::default());
    }

    pub fn start_search(&self, query: &str, total_methods: usize) {
        self.update(|state| {
            *state = ProgressState {
                status: ProgressStatus::Searching,
                message: format!("Searching for '{query}'"),
                search_total: total_methods,
                ..ProgressState::default()
            };
        });
    }

    /// Records one finished (or skipped) discovery method.
    pub fn search_step(&self, method: &str, candidates_so_far: usize) {
        self.update(|state| {
            state.search_completed += 1;
            state.message = format!("{method}: {candidates_so_far} candidates");
        });
    }

    pub fn finish_search(&self, candidates: usize) {
        self.update(|state| {
            state.status = ProgressStatus::SearchComplete;
            state.search_completed = state.search_total;
            state.message = format!("Found {candidates} candidates");
        });
    }

    pub fn start_scrape(&self, total: usize) {
        self.update(|state| {
            state.status = ProgressStatus::Scraping;
            state.scrape_total = total;
            state.scrape_completed = 0;
            state.scrape_failed = 0;
            state.message = format!("Scraping {total} pages");
        });
    }

    /// Records one finished scrape task, successful or not.
    pub fn scrape_tick(&self, success: bool) {
        self.update(|state| {
            state.scrape_completed += 1;
            if !success {
                state.scrape_failed += 1;
            }
            state.message = format!(
                "Scraped {}/{} pages",
                state.scrape_completed, state.scrape_total
            );
        });
    }

    pub fn finish_scrape(&self, records: usize) {
        self.update(|state| {
            state.status = ProgressStatus::ScrapingComplete;
            state.message = format!(
                "Scraped {records} products from {} pages",
                state.scrape_total
            );
        });
    }

    /// Marks the search as finished without results, e.g. nothing was
    /// discovered.
    pub fn finish_empty(&self, reason: &str) {
        self.update(|state| {
            state.status = ProgressStatus::ScrapingComplete;
            state.message = reason.to_string();
            state.error = Some(reason.to_string());
        });
    }
}
