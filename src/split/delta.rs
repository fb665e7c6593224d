//! Per-segment deltas of a live run against a comparison series

use serde::{Deserialize, Serialize};

use super::comparison::ComparisonMode;
use super::gaps::duration_since_anchor;
use super::model::Attempts;

/// Time difference for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub segment_index: usize,
    /// Cumulative delta. Positive = behind, negative = ahead.
    pub delta_ms: i64,
    /// Segment time beats the best ever recorded for this segment
    pub is_best_ever: bool,
    pub is_ahead: bool,
    /// Segment time beats the comparison's own segment time
    pub gained_time: bool,
    /// No segment time could be attributed
    pub skipped: bool,
}

/// Signed difference between a live cumulative split and a comparison split
pub fn compute_delta(current_split_ms: i64, comparison_split_ms: i64) -> i64 {
    current_split_ms - comparison_split_ms
}

/// Compute a delta for every entry of `current_splits`.
///
/// Entries that are `0`, repeat the previous recorded time, or have no
/// recorded time before them are marked skipped and carry no delta.
pub fn compute_split_deltas(
    attempts: &Attempts,
    current_splits: &[i64],
    mode: ComparisonMode,
) -> Vec<Delta> {
    let comparison = attempts.comparison_splits(mode).unwrap_or_default();
    let best_segments = attempts.best_segments();

    current_splits
        .iter()
        .enumerate()
        .map(|(i, &split_ms)| {
            let mut delta = Delta {
                segment_index: i,
                ..Default::default()
            };

            let Some(segment_ms) = duration_since_anchor(current_splits, i) else {
                delta.skipped = true;
                return delta;
            };

            if let Some(&best) = best_segments.get(i).filter(|&&b| b > 0) {
                delta.is_best_ever = segment_ms < best;
            }

            if let Some(&comparison_ms) = comparison.get(i).filter(|&&c| c > 0) {
                delta.delta_ms = compute_delta(split_ms, comparison_ms);
                delta.is_ahead = delta.delta_ms < 0;
                delta.gained_time = duration_since_anchor(&comparison, i)
                    .is_some_and(|comparison_segment| segment_ms < comparison_segment);
            }

            delta
        })
        .collect()
}

impl Attempts {
    /// Deltas of a live run against this history
    pub fn split_deltas(&self, current_splits: &[i64], mode: ComparisonMode) -> Vec<Delta> {
        compute_split_deltas(self, current_splits, mode)
    }
}
