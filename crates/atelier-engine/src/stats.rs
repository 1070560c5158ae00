//! Workflow statistics
//!
//! Aggregate counts computed over freshly derived stage labels, never the
//! cached ones, so a stale cache cannot skew a report.

use crate::deriver::derive_current_stage;
use atelier_domain::ProjectSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate workflow counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowStats {
    /// Projects whose derivation is not yet terminal
    pub in_progress: usize,
    /// Projects deriving the terminal label
    pub done: usize,
    /// Non-done projects past their planned completion date
    pub overdue: usize,
}

impl WorkflowStats {
    /// Compute stats over a set of projects
    ///
    /// `now` is passed in so the computation stays pure and testable.
    #[must_use]
    pub fn compute(snapshots: &[ProjectSnapshot], now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        for snapshot in snapshots {
            let label =
                derive_current_stage(snapshot.record.as_ref(), snapshot.meta.project_type);
            if label.is_done() {
                stats.done += 1;
            } else {
                stats.in_progress += 1;
                if snapshot.meta.due_on.is_some_and(|due| due < now) {
                    stats.overdue += 1;
                }
            }
        }
        stats
    }
}
