//! Attempt history and comparison analytics
//!
//! This module contains the run data model and the pure functions computed
//! over it:
//! - `Attempts` / `Attempt` / `Template` - Run history and blueprints
//! - `ComparisonMode` - Personal best, best segments, average, latest run
//! - `Delta` - Per-segment comparison of a live run
//! - Gap detection and estimation for skipped segments

mod comparison;
mod delta;
mod gaps;
mod model;

pub use comparison::ComparisonMode;
pub use delta::{compute_delta, compute_split_deltas, Delta};
pub use gaps::{
    duration_since_anchor, estimate_gaps, gap_regions, has_estimable_gaps, is_effectively_skipped,
    is_skipped, previous_recorded, segment_duration, GapRegion,
};
pub use model::{is_strictly_increasing, Attempt, Attempts, Segment, Template};
