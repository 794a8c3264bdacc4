//! Test score: how far the joint moved overall.

use crate::util::round_tenth;

/// Sum of absolute per-channel deviations, rounded to one decimal place.
///
/// Pure and order-independent; an empty vector scores 0.0.
pub fn score(max_difference: &[f64]) -> f64 {
    round_tenth(max_difference.iter().map(|v| v.abs()).sum())
}
