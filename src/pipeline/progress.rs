// src/pipeline/progress.rs

//! Progress counters for a detail stage.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Category;

/// Counters for one detail stage, owned by the stage and returned when it ends.
///
/// `processed` includes records found on disk when the stage started, so it
/// reads the same way across resumed runs. File presence, not these counters,
/// decides what is already done.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub category: Category,
    /// Entries in the list manifest
    pub total: usize,
    /// Records persisted, including those resumed from disk
    pub processed: usize,
    /// Records persisted before this run started
    pub resumed: usize,
    /// Records dropped after exhausting their retries
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn new(category: Category, total: usize, resumed: usize) -> Self {
        Self {
            category,
            total,
            processed: resumed,
            resumed,
            failed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Records persisted by this run.
    pub fn persisted_this_run(&self) -> usize {
        self.processed.saturating_sub(self.resumed)
    }

    /// Manifest entries neither persisted nor dropped.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed + self.failed)
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }

    /// `processed/total (pct%)`
    pub fn status_line(&self) -> String {
        format!("{}/{} ({:.2}%)", self.processed, self.total, self.percent())
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_start_from_resumed() {
        let mut progress = Progress::new(Category::Firms, 4, 1);
        progress.record_success();
        progress.record_failure();

        assert_eq!(progress.processed, 2);
        assert_eq!(progress.persisted_this_run(), 1);
        assert_eq!(progress.remaining(), 1);
        assert_eq!(progress.status_line(), "2/4 (50.00%)");
    }

    #[test]
    fn test_empty_manifest_is_complete() {
        let progress = Progress::new(Category::Funds, 0, 0);
        assert_eq!(progress.percent(), 100.0);
    }
}
