use crate::joint::TestIdentifier;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One completed mobility test. Created once when a session completes and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_identifier: TestIdentifier,
    /// Completion time, RFC 3339.
    pub timestamp: String,
    pub score: f64,
    /// Per-channel maximum deviation from baseline, rounded to one decimal.
    pub max_difference: Vec<f64>,
}

impl TestResult {
    pub fn new(
        test_identifier: TestIdentifier,
        completed_at: DateTime<Utc>,
        score: f64,
        max_difference: Vec<f64>,
    ) -> Self {
        Self {
            test_identifier,
            timestamp: format_timestamp(completed_at),
            score,
            max_difference,
        }
    }
}

pub fn format_timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
