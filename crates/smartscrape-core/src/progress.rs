use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of a search call as reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    Idle,
    Searching,
    SearchComplete,
    Scraping,
    ScrapingComplete,
}

/// Snapshot of a search's progress.
///
/// The live copy is owned by the scraper's progress tracker and guarded by a
/// mutex; observers only ever receive clones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    pub status: ProgressStatus,
    pub message: String,
    /// Discovery methods finished so far.
    pub search_completed: usize,
    pub search_total: usize,
    /// Candidates processed so far, successful or not.
    pub scrape_completed: usize,
    pub scrape_total: usize,
    /// Candidates that produced no record.
    pub scrape_failed: usize,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressState {
    /// Fraction of scrape work done, in `[0.0, 1.0]`.
    #[must_use]
    pub fn scrape_fraction(&self) -> f64 {
        if self.scrape_total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let fraction = self.scrape_completed as f64 / self.scrape_total as f64;
        fraction.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = ProgressState::default();
        assert_eq!(state.status, ProgressStatus::Idle);
        assert_eq!(state.scrape_fraction(), 0.0);
    }

    #[test]
    fn scrape_fraction_is_clamped() {
        let state = ProgressState {
            scrape_completed: 6,
            scrape_total: 4,
            ..ProgressState::default()
        };
        assert!((state.scrape_fraction() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ProgressStatus::SearchComplete).unwrap();
        assert_eq!(json, "\"search_complete\"");
    }
}
