//! Comparison series derived on demand from attempt history
//!
//! Nothing here is cached: every series is recomputed from `history`, so
//! deleting or editing an attempt is reflected immediately.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::gaps::{is_effectively_skipped, segment_duration};
use super::model::{Attempt, Attempts};

/// Which series a live run is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ComparisonMode {
    /// Fastest completed attempt
    #[default]
    PersonalBest,
    /// Sum of best individual segments
    BestSegments,
    /// Mean cumulative time per segment
    AverageSegments,
    /// Most recent attempt with any recorded split
    LatestRun,
}

impl ComparisonMode {
    /// Parse a mode name; unknown names fall back to personal best
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "best_segments" => Self::BestSegments,
            "average_segments" => Self::AverageSegments,
            "latest_run" => Self::LatestRun,
            _ => Self::PersonalBest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalBest => "personal_best",
            Self::BestSegments => "best_segments",
            Self::AverageSegments => "average_segments",
            Self::LatestRun => "latest_run",
        }
    }
}

impl From<&str> for ComparisonMode {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for ComparisonMode {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Attempts {
    /// Cumulative splits of the fastest completed attempt.
    ///
    /// Effectively skipped entries before the final split are reported as
    /// `0`. Attempts whose final split was skipped do not qualify.
    pub fn personal_best_splits(&self) -> Option<Vec<i64>> {
        let mut best: Option<(i64, &Attempt)> = None;
        for attempt in self.history.iter().filter(|a| a.completed) {
            let Some(t) = attempt.final_time_ms() else {
                continue;
            };
            if best.map_or(true, |(best_t, _)| t < best_t) {
                best = Some((t, attempt));
            }
        }
        let (_, best) = best?;

        let splits = &best.split_times_ms;
        let last = splits.len().saturating_sub(1);
        Some(
            splits
                .iter()
                .enumerate()
                .map(|(i, &t)| {
                    if i < last && is_effectively_skipped(splits, i) {
                        0
                    } else {
                        t
                    }
                })
                .collect(),
        )
    }

    /// Lowest individual duration seen for each segment across all history,
    /// complete or not. `0` means no measurable duration was ever recorded.
    pub fn best_segments(&self) -> Vec<i64> {
        let mut best = vec![0i64; self.segments.len()];

        for attempt in &self.history {
            let splits = &attempt.split_times_ms;
            for (i, slot) in best.iter_mut().enumerate().take(splits.len()) {
                if let Some(duration) = segment_duration(splits, i) {
                    if *slot == 0 || duration < *slot {
                        *slot = duration;
                    }
                }
            }
        }

        best
    }

    /// Running sum of [`best_segments`](Self::best_segments), stopping at the
    /// first segment without a best. `None` if the first segment has none.
    pub fn best_segments_cumulative(&self) -> Option<Vec<i64>> {
        let best = self.best_segments();
        if best.first().copied().unwrap_or(0) == 0 {
            return None;
        }

        let mut cumulative = vec![0i64; best.len()];
        let mut sum = 0;
        for (slot, &segment) in cumulative.iter_mut().zip(&best) {
            if segment == 0 {
                break;
            }
            sum += segment;
            *slot = sum;
        }
        Some(cumulative)
    }

    /// Mean of the recorded cumulative times at each segment, across every
    /// attempt that reached it. `None` if no segment has a sample.
    pub fn average_splits(&self) -> Option<Vec<i64>> {
        let n = self.segments.len();
        let mut sums = vec![0i64; n];
        let mut counts = vec![0i64; n];

        for attempt in &self.history {
            for (i, &t) in attempt.split_times_ms.iter().enumerate().take(n) {
                if t == 0 {
                    continue;
                }
                sums[i] += t;
                counts[i] += 1;
            }
        }

        if counts.iter().all(|&c| c == 0) {
            return None;
        }

        Some(
            sums.iter()
                .zip(&counts)
                .map(|(&sum, &count)| if count == 0 { 0 } else { sum / count })
                .collect(),
        )
    }

    /// Splits of the most recent attempt with at least one recorded time
    pub fn latest_run_splits(&self) -> Option<Vec<i64>> {
        self.history
            .iter()
            .rev()
            .find(|a| a.has_recorded_split())
            .map(|a| a.split_times_ms.clone())
    }

    /// Resolve the comparison series for a mode
    pub fn comparison_splits(&self, mode: ComparisonMode) -> Option<Vec<i64>> {
        match mode {
            ComparisonMode::PersonalBest => self.personal_best_splits(),
            ComparisonMode::BestSegments => self.best_segments_cumulative(),
            ComparisonMode::AverageSegments => self.average_splits(),
            ComparisonMode::LatestRun => self.latest_run_splits(),
        }
    }
}
