//! Comparison and history behaviour end to end

use goldsplit_core::split::{compute_split_deltas, Attempts, ComparisonMode, Template};

fn attempts(n: usize) -> Attempts {
    let names: Vec<String> = (0..n).map(|i| format!("Split {i}")).collect();
    let template = Template::create("Test Game", names);
    Attempts::from_template(&template, "Test Game", "Any%")
}

#[test]
fn test_personal_best_follows_faster_runs() {
    let mut att = attempts(2);
    att.add_attempt(vec![1000, 3000], true);
    att.add_attempt(vec![900, 2500], true);
    assert_eq!(att.personal_best_splits(), Some(vec![900, 2500]));

    att.add_attempt(vec![1100, 2700], true);
    assert_eq!(att.personal_best_splits(), Some(vec![900, 2500]));
}

#[test]
fn test_deleting_personal_best_falls_back() {
    let mut att = attempts(2);
    att.add_attempt(vec![1000, 3000], true);
    let pb = att.add_attempt(vec![900, 2500], true);

    assert!(att.delete_attempt(pb));
    assert_eq!(att.personal_best_splits(), Some(vec![1000, 3000]));
    assert_eq!(att.attempt_count, 1);

    // Ids are never handed out twice
    let next = att.add_attempt(vec![800, 2000], true);
    assert!(next > pb);
}

#[test]
fn test_best_segments_mix_attempts() {
    let mut att = attempts(3);
    att.add_attempt(vec![1000, 2500, 4000], true);
    att.add_attempt(vec![1100, 2100, 4100], true);
    assert_eq!(att.best_segments(), vec![1000, 1000, 1500]);
}

#[test]
fn test_effectively_skipped_attempt() {
    let mut att = attempts(5);
    att.add_attempt(vec![1000, 1000, 1000, 1000, 2000], true);

    assert_eq!(att.best_segments(), vec![1000, 0, 0, 0, 1000]);
    assert_eq!(att.personal_best_splits(), Some(vec![1000, 0, 0, 0, 2000]));
}

#[test]
fn test_gap_estimation_on_history() {
    let mut att = attempts(5);
    let id = att.add_attempt(vec![1000, 1000, 1000, 1000, 5000], true);
    assert!(att.estimate_gaps(id));
    assert_eq!(att.attempt(id).unwrap().split_times_ms, vec![1000, 2000, 3000, 4000, 5000]);

    let leading = att.add_attempt(vec![0, 2000, 3000, 4000, 5000], true);
    assert!(!att.estimate_gaps(leading));
    assert_eq!(att.attempt(leading).unwrap().split_times_ms, vec![0, 2000, 3000, 4000, 5000]);

    let trailing = att.add_attempt(vec![1000, 2000, 3000, 4000, 0], false);
    assert!(!att.estimate_gaps(trailing));
}

#[test]
fn test_edit_attempt_validation() {
    let mut att = attempts(3);
    let id = att.add_attempt(vec![1000, 2000, 3000], true);

    assert!(!att.edit_attempt_splits(id, vec![2000, 1000, 3000]));
    assert!(!att.edit_attempt_splits(id, vec![1000, 1000, 3000]));
    assert!(!att.edit_attempt_splits(id, vec![1000, 2000]));
    assert!(!att.edit_attempt_splits(id + 1, vec![1000, 2000, 3000]));
    assert_eq!(att.attempt(id).unwrap().split_times_ms, vec![1000, 2000, 3000]);

    assert!(att.edit_attempt_splits(id, vec![900, 0, 2800]));
    assert_eq!(att.personal_best_splits(), Some(vec![900, 0, 2800]));
}

#[test]
fn test_live_deltas_against_personal_best() {
    let mut att = attempts(3);
    att.add_attempt(vec![1000, 2500, 4000], true);

    let deltas = compute_split_deltas(&att, &[900, 2300, 3800], ComparisonMode::PersonalBest);

    assert_eq!(deltas[0].delta_ms, -100);
    assert!(deltas[0].is_ahead);
    assert!(deltas[0].gained_time);

    assert_eq!(deltas[2].delta_ms, -200);
    assert!(deltas[2].is_ahead);
    assert!(!deltas[2].gained_time);
}

#[test]
fn test_every_mode_resolves_after_one_run() {
    let mut att = attempts(2);
    att.add_attempt(vec![1500, 3000], true);

    for mode in [
        ComparisonMode::PersonalBest,
        ComparisonMode::BestSegments,
        ComparisonMode::AverageSegments,
        ComparisonMode::LatestRun,
    ] {
        assert_eq!(att.comparison_splits(mode), Some(vec![1500, 3000]), "mode {mode}");
    }
}

#[test]
fn test_history_survives_json() {
    let mut att = attempts(2);
    att.add_attempt(vec![1000, 2000], true);
    att.add_attempt(vec![1200], false);

    let json = serde_json::to_string(&att).unwrap();
    let back: Attempts = serde_json::from_str(&json).unwrap();

    assert_eq!(back.history, att.history);
    assert_eq!(back.personal_best_splits(), Some(vec![1000, 2000]));
    assert_eq!(back.latest_run_splits(), Some(vec![1200]));
}
