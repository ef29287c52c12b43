// Check Result and Report Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Status};

/// Outcome of one probe invocation
///
/// Exactly one of these exists per dispatched probe, even when the probe
/// panicked or exceeded its deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub probe_name: String,
    pub category: Category,
    pub status: Status,
    /// Human-readable detail, for display only
    pub message: String,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Aggregated output of one executor run
///
/// Immutable once built. Result order is category registration order,
/// then probe registration order within a category - never completion
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub results: Vec<CheckResult>,
    pub overall_status: Status,
    pub generated_at: DateTime<Utc>,
    pub total_duration_ms: u64,
}

impl Report {
    /// Build a report from ordered results, deriving the overall status
    pub fn new(results: Vec<CheckResult>, generated_at: DateTime<Utc>, total_duration_ms: u64) -> Self {
        let overall_status = aggregate(&results);
        Self {
            results,
            overall_status,
            generated_at,
            total_duration_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Fold per-result severities into an overall verdict
///
/// Fail if any Fail/Error/Timeout is present, else Warn if any Warn,
/// else Pass. An empty result set is Pass by convention (empty success),
/// so "no probes selected" is a valid, reportable state.
pub fn aggregate(results: &[CheckResult]) -> Status {
    match results.iter().map(|r| r.status.severity()).max() {
        Some(2) => Status::Fail,
        Some(1) => Status::Warn,
        _ => Status::Pass,
    }
}
