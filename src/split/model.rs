//! Run data model: templates, segments and attempt history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named stage of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub name: String,
}

impl Segment {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A single recorded attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    /// Sequence number, unique within its [`Attempts`]
    pub id: u32,
    pub started_at: DateTime<Utc>,
    /// Cumulative split times in ms (0 = skipped). Shorter than the segment
    /// list when the run was abandoned early.
    pub split_times_ms: Vec<i64>,
    pub completed: bool,
}

impl Attempt {
    /// Final cumulative time, if the last entry was recorded
    pub fn final_time_ms(&self) -> Option<i64> {
        self.split_times_ms.last().copied().filter(|&t| t != 0)
    }

    /// Whether at least one segment has a recorded time
    pub fn has_recorded_split(&self) -> bool {
        self.split_times_ms.iter().any(|&t| t != 0)
    }
}

/// Reusable blueprint: a run name and its ordered segment names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub segment_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a template with an explicit id
    pub fn new(id: impl Into<String>, name: impl Into<String>, segment_names: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            segment_names,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a template with a fresh random id
    pub fn create(name: impl Into<String>, segment_names: Vec<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), name, segment_names)
    }

    /// Rename and re-segment. Existing [`Attempts`] keep their own snapshot.
    pub fn update(&mut self, name: impl Into<String>, segment_names: Vec<String>) {
        self.name = name.into();
        self.segment_names = segment_names;
        self.updated_at = Utc::now();
    }
}

/// Attempt history for one run category.
///
/// Segments are snapshotted from a [`Template`] at creation time and do not
/// follow later template edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempts {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub category_name: String,
    pub segments: Vec<Segment>,
    /// Number of attempts on record
    pub attempt_count: u32,
    /// Highest id ever handed out; ids are never reused after deletion
    #[serde(default)]
    pub last_attempt_id: u32,
    #[serde(default)]
    pub history: Vec<Attempt>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attempts {
    /// Create an empty history with an explicit id
    pub fn new(
        id: impl Into<String>,
        template_id: impl Into<String>,
        name: impl Into<String>,
        category_name: impl Into<String>,
        segment_names: &[String],
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            template_id: template_id.into(),
            name: name.into(),
            category_name: category_name.into(),
            segments: segment_names.iter().map(Segment::new).collect(),
            attempt_count: 0,
            last_attempt_id: 0,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Snapshot a template's segments into a new history with a fresh id
    pub fn from_template(
        template: &Template,
        name: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self::new(
            Uuid::new_v4().to_string(),
            template.id.clone(),
            name,
            category_name,
            &template.segment_names,
        )
    }

    /// Names of all segments, in order
    pub fn segment_names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Look up an attempt by id
    pub fn attempt(&self, attempt_id: u32) -> Option<&Attempt> {
        self.history.iter().find(|a| a.id == attempt_id)
    }

    pub(crate) fn attempt_mut(&mut self, attempt_id: u32) -> Option<&mut Attempt> {
        self.history.iter_mut().find(|a| a.id == attempt_id)
    }

    fn next_attempt_id(&self) -> u32 {
        let highest_in_history = self.history.iter().map(|a| a.id).max().unwrap_or(0);
        self.last_attempt_id
            .max(self.attempt_count)
            .max(highest_in_history)
            + 1
    }

    /// Append an attempt and return the id it was given
    pub fn add_attempt(&mut self, split_times_ms: Vec<i64>, completed: bool) -> u32 {
        let id = self.next_attempt_id();
        self.attempt_count += 1;
        self.last_attempt_id = id;
        self.history.push(Attempt {
            id,
            started_at: Utc::now(),
            split_times_ms,
            completed,
        });
        self.touch();

        log::debug!(
            "{}: recorded attempt #{} ({})",
            self.name,
            id,
            if completed { "completed" } else { "incomplete" }
        );
        id
    }

    /// Remove an attempt. Surviving ids are left as they are.
    pub fn delete_attempt(&mut self, attempt_id: u32) -> bool {
        let Some(idx) = self.history.iter().position(|a| a.id == attempt_id) else {
            return false;
        };

        self.history.remove(idx);
        self.attempt_count = self.attempt_count.saturating_sub(1);
        self.touch();
        true
    }

    /// Replace an attempt's split array.
    ///
    /// Rejected when the attempt does not exist, the length differs from the
    /// attempt's recorded length, or non-zero values are not strictly
    /// increasing.
    pub fn edit_attempt_splits(&mut self, attempt_id: u32, new_splits: Vec<i64>) -> bool {
        if !is_strictly_increasing(&new_splits) {
            return false;
        }

        let Some(attempt) = self.attempt_mut(attempt_id) else {
            return false;
        };
        if attempt.split_times_ms.len() != new_splits.len() {
            return false;
        }

        attempt.split_times_ms = new_splits;
        self.touch();
        true
    }

    /// Drop the most recent attempt (used when a finished run is discarded)
    pub fn discard_latest(&mut self) -> Option<Attempt> {
        let attempt = self.history.pop()?;
        self.attempt_count = self.attempt_count.saturating_sub(1);
        self.touch();
        Some(attempt)
    }

    pub fn rename_category(&mut self, category_name: impl Into<String>) {
        self.category_name = category_name.into();
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Non-zero values strictly increase in index order; zeros may appear anywhere.
/// Negative values are never valid.
pub fn is_strictly_increasing(splits: &[i64]) -> bool {
    let mut last_recorded = 0;
    for &t in splits {
        if t == 0 {
            continue;
        }
        if t <= last_recorded {
            return false;
        }
        last_recorded = t;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn attempts(n: usize) -> Attempts {
        let segs: Vec<String> = (0..n).map(|i| format!("S{i}")).collect();
        Attempts::new("att-1", "tmpl-1", "Any%", "Glitchless", &segs)
    }

    #[test]
    fn test_from_template_snapshots_segments() {
        let mut tmpl = Template::create("Game", names(&["A", "B"]));
        let att = Attempts::from_template(&tmpl, "Game", "Any%");
        assert_eq!(att.template_id, tmpl.id);
        assert_eq!(att.segment_names(), names(&["A", "B"]));

        tmpl.update("Game 2", names(&["X"]));
        assert_eq!(att.segment_count(), 2);
        assert_eq!(tmpl.name, "Game 2");
    }

    #[test]
    fn test_add_attempt_assigns_sequence_ids() {
        let mut att = attempts(2);
        assert_eq!(att.add_attempt(vec![1000, 2000], true), 1);
        assert_eq!(att.add_attempt(vec![900], false), 2);
        assert_eq!(att.attempt_count, 2);
        assert!(att.attempt(2).is_some_and(|a| !a.completed));
    }

    #[test]
    fn test_delete_attempt_keeps_ids() {
        let mut att = attempts(2);
        att.add_attempt(vec![1000, 2000], true);
        att.add_attempt(vec![1100, 2100], true);
        att.add_attempt(vec![1200, 2200], true);

        assert!(att.delete_attempt(2));
        assert_eq!(att.attempt_count, 2);
        let ids: Vec<u32> = att.history.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert!(!att.delete_attempt(2));
        assert!(!att.delete_attempt(99));
    }

    #[test]
    fn test_ids_never_reused_after_delete() {
        let mut att = attempts(1);
        att.add_attempt(vec![1000], true);
        att.add_attempt(vec![900], true);
        assert!(att.delete_attempt(2));

        assert_eq!(att.add_attempt(vec![800], true), 3);
    }

    #[test]
    fn test_edit_attempt_splits() {
        let mut att = attempts(3);
        att.add_attempt(vec![1000, 2000, 3000], true);

        assert!(att.edit_attempt_splits(1, vec![1000, 0, 2500]));
        assert_eq!(att.attempt(1).unwrap().split_times_ms, vec![1000, 0, 2500]);

        assert!(!att.edit_attempt_splits(1, vec![2000, 1000, 3000]));
        assert!(!att.edit_attempt_splits(1, vec![1000, 1000, 3000]));
        assert!(!att.edit_attempt_splits(1, vec![1000, 2000]));
        assert!(!att.edit_attempt_splits(7, vec![1000, 2000, 3000]));
    }

    #[test]
    fn test_edit_incomplete_attempt_uses_recorded_length() {
        let mut att = attempts(4);
        att.add_attempt(vec![1000, 2000], false);

        assert!(att.edit_attempt_splits(1, vec![1100, 2100]));
        assert!(!att.edit_attempt_splits(1, vec![1100, 2100, 3100, 4100]));
    }

    #[test]
    fn test_strictly_increasing() {
        assert!(is_strictly_increasing(&[]));
        assert!(is_strictly_increasing(&[0, 0]));
        assert!(is_strictly_increasing(&[0, 1000, 0, 3000]));
        assert!(!is_strictly_increasing(&[1000, 0, 900]));
        assert!(!is_strictly_increasing(&[-5, 100]));
    }

    #[test]
    fn test_discard_latest() {
        let mut att = attempts(1);
        assert!(att.discard_latest().is_none());
        att.add_attempt(vec![1000], true);
        assert_eq!(att.discard_latest().map(|a| a.id), Some(1));
        assert_eq!(att.attempt_count, 0);
    }

    #[test]
    fn test_json_shape_and_legacy_fields() {
        let json = r#"{
            "id": "a",
            "templateId": "t",
            "name": "Game",
            "categoryName": "Any%",
            "segments": [{"name": "A", "personalBestMs": 1000, "bestSegmentMs": 1000}],
            "attemptCount": 1,
            "history": [
                {"id": 1, "startedAt": "2024-01-01T00:00:00Z", "splitTimesMs": [1000], "completed": true}
            ],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;

        let mut att: Attempts = serde_json::from_str(json).unwrap();
        assert_eq!(att.segments[0].name, "A");
        assert_eq!(att.last_attempt_id, 0);
        assert_eq!(att.add_attempt(vec![900], true), 2);

        let value = serde_json::to_value(&att).unwrap();
        assert_eq!(value["categoryName"], "Any%");
        assert_eq!(value["history"][1]["splitTimesMs"][0], 900);
    }
}
