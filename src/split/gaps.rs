//! Skipped-segment detection and gap estimation
//!
//! A segment is "effectively skipped" when its cumulative time equals the
//! nearest earlier recorded time: the run's timeline is intact but no time
//! was attributed to the segment. For segment durations it behaves exactly
//! like an explicit `0`.

use super::model::Attempts;

/// Nearest non-zero cumulative time strictly before `index`
pub fn previous_recorded(splits: &[i64], index: usize) -> Option<i64> {
    splits[..index.min(splits.len())]
        .iter()
        .rev()
        .copied()
        .find(|&t| t != 0)
}

/// Whether `splits[index]` repeats the previous recorded time
pub fn is_effectively_skipped(splits: &[i64], index: usize) -> bool {
    match splits.get(index) {
        Some(&t) if t != 0 => previous_recorded(splits, index) == Some(t),
        _ => false,
    }
}

/// Explicit `0` or effectively skipped
pub fn is_skipped(splits: &[i64], index: usize) -> bool {
    splits.get(index) == Some(&0) || is_effectively_skipped(splits, index)
}

/// A segment's own duration, measurable only when the entry and its
/// immediate predecessor were both recorded (or it is the first segment).
pub fn segment_duration(splits: &[i64], index: usize) -> Option<i64> {
    let current = *splits.get(index)?;
    if current == 0 {
        return None;
    }
    if index == 0 {
        return Some(current);
    }

    let previous = splits[index - 1];
    if previous == 0 {
        return None;
    }
    let duration = current - previous;
    (duration > 0).then_some(duration)
}

/// Duration measured from the last recorded time before `index`, bridging
/// over explicit skips. `None` when there is no such anchor or no time was
/// attributed to the segment.
pub fn duration_since_anchor(splits: &[i64], index: usize) -> Option<i64> {
    let current = *splits.get(index)?;
    if current == 0 {
        return None;
    }
    if index == 0 {
        return Some(current);
    }

    let anchor = previous_recorded(splits, index)?;
    let duration = current - anchor;
    (duration > 0).then_some(duration)
}

/// A maximal run of skipped indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapRegion {
    /// First skipped index
    pub start: usize,
    /// Number of consecutive skipped indices
    pub len: usize,
    /// Last recorded time before the region
    pub left: Option<i64>,
    /// First recorded time after the region
    pub right: Option<i64>,
}

impl GapRegion {
    /// Both anchors exist and the timeline advances across the region
    pub fn is_estimable(&self) -> bool {
        matches!((self.left, self.right), (Some(l), Some(r)) if r > l)
    }

    /// Linear interpolation for the `m`-th index of the region (1-based)
    fn interpolate(&self, m: usize) -> Option<i64> {
        let (left, right) = (self.left?, self.right?);
        let slots = (self.len + 1) as i64;
        Some(left + (right - left) * m as i64 / slots)
    }
}

/// Find every gap region in a cumulative split array
pub fn gap_regions(splits: &[i64]) -> Vec<GapRegion> {
    let mut regions = Vec::new();
    let mut open: Option<GapRegion> = None;
    let mut last_recorded: Option<i64> = None;

    for (i, &t) in splits.iter().enumerate() {
        let skipped = t == 0 || Some(t) == last_recorded;

        if skipped {
            match open.as_mut() {
                Some(region) => region.len += 1,
                None => {
                    open = Some(GapRegion {
                        start: i,
                        len: 1,
                        left: last_recorded,
                        right: None,
                    })
                }
            }
            continue;
        }

        if let Some(mut region) = open.take() {
            region.right = Some(t);
            regions.push(region);
        }
        last_recorded = Some(t);
    }

    if let Some(region) = open {
        regions.push(region);
    }
    regions
}

/// Whether any region could be filled in
pub fn has_estimable_gaps(splits: &[i64]) -> bool {
    gap_regions(splits).iter().any(GapRegion::is_estimable)
}

/// Fill every estimable region by linear interpolation between its anchors.
/// Returns whether any value changed.
pub fn estimate_gaps(splits: &mut [i64]) -> bool {
    let mut changed = false;

    for region in gap_regions(splits).into_iter().filter(GapRegion::is_estimable) {
        for m in 1..=region.len {
            let Some(estimate) = region.interpolate(m) else {
                continue;
            };
            let slot = &mut splits[region.start + m - 1];
            if *slot != estimate {
                *slot = estimate;
                changed = true;
            }
        }
    }

    changed
}

impl Attempts {
    /// Whether the attempt has at least one gap bounded on both sides
    pub fn has_estimable_gaps(&self, attempt_id: u32) -> bool {
        self.attempt(attempt_id)
            .is_some_and(|a| has_estimable_gaps(&a.split_times_ms))
    }

    /// Interpolate the attempt's bounded gaps in place.
    /// Returns `false` if the attempt is unknown or nothing changed.
    pub fn estimate_gaps(&mut self, attempt_id: u32) -> bool {
        let Some(attempt) = self.attempt_mut(attempt_id) else {
            return false;
        };
        if !estimate_gaps(&mut attempt.split_times_ms) {
            return false;
        }

        log::debug!("{}: estimated gaps in attempt #{}", self.name, attempt_id);
        self.touch();
        true
    }
}
