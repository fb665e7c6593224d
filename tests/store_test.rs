//! On-disk persistence and a full session against a real file store

use goldsplit_core::persist::{FileStore, Settings};
use goldsplit_core::split::{Attempts, ComparisonMode, Template};
use goldsplit_core::timer::{ManualClock, TimerEngine, TimerState};
use goldsplit_core::{Action, SplitSession};
use std::sync::Arc;
use std::time::Duration;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn segments() -> Vec<String> {
    vec!["Forsaken City".into(), "Old Site".into(), "Celestial Resort".into()]
}

fn session_on(store: &FileStore, clock: Arc<ManualClock>) -> SplitSession {
    let engine = TimerEngine::builder()
        .clock(clock)
        .tick_interval(Duration::from_secs(60))
        .build();
    SplitSession::new(engine, Arc::new(store.clone()))
}

#[test]
fn test_runs_are_persisted() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let template = Template::create("Celeste", segments());
    store.save_template(&template).unwrap();
    let attempts = Attempts::from_template(&template, "Celeste", "Any%");
    store.save_attempts(&attempts).unwrap();

    let clock = Arc::new(ManualClock::new());
    let mut session = session_on(&store, clock.clone());
    assert!(session.set_attempts(store.load_attempts(&attempts.id).unwrap()));

    session.dispatch(Action::StartSplit).unwrap();
    for ms in [60_000, 90_000, 120_000] {
        clock.advance_ms(ms);
        session.dispatch(Action::StartSplit).unwrap();
    }
    assert_eq!(session.engine().state(), TimerState::Finished);
    session.dispatch(Action::Reset).unwrap();

    session.dispatch(Action::StartSplit).unwrap();
    clock.advance_ms(50_000);
    session.dispatch(Action::StartSplit).unwrap();
    session.dispatch(Action::Reset).unwrap();

    let reloaded = store.load_attempts(&attempts.id).unwrap();
    assert_eq!(reloaded.attempt_count, 2);
    assert_eq!(reloaded.history[0].split_times_ms, vec![60_000, 150_000, 270_000]);
    assert!(reloaded.history[0].completed);
    assert_eq!(reloaded.history[1].split_times_ms, vec![50_000]);
    assert!(!reloaded.history[1].completed);
    assert_eq!(reloaded.personal_best_splits(), Some(vec![60_000, 150_000, 270_000]));
}

#[test]
fn test_suspended_run_survives_restart() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let template = Template::create("Celeste", segments());
    let attempts = Attempts::from_template(&template, "Celeste", "Any%");
    store.save_attempts(&attempts).unwrap();

    {
        let clock = Arc::new(ManualClock::new());
        let mut session = session_on(&store, clock.clone());
        session.set_attempts(attempts.clone());

        session.start_split().unwrap();
        clock.advance_ms(10_000);
        session.start_split().unwrap();
        clock.advance_ms(2_500);
        assert!(session.suspend().unwrap());
    }

    let suspended = store.load_suspended_run().unwrap().unwrap();
    assert_eq!(suspended.attempts_id, attempts.id);
    assert_eq!(suspended.elapsed_ms, 12_500);

    // A fresh process picks the run back up
    let clock = Arc::new(ManualClock::new());
    let mut session = session_on(&store, clock.clone());
    session.set_attempts(store.load_attempts(&attempts.id).unwrap());
    assert!(session.resume_suspended().unwrap());
    assert_eq!(session.engine().elapsed_ms(), 12_500);
    assert!(store.load_suspended_run().unwrap().is_none());

    session.toggle_pause();
    clock.advance_ms(7_500);
    session.skip_split().unwrap();
    clock.advance_ms(5_000);
    session.start_split().unwrap();

    let reloaded = store.load_attempts(&attempts.id).unwrap();
    assert_eq!(reloaded.history.len(), 1);
    assert_eq!(reloaded.history[0].split_times_ms, vec![10_000, 0, 25_000]);
    assert!(reloaded.history[0].completed);
}

#[test]
fn test_settings_drive_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let mut settings = store.load_settings().unwrap();
    settings.comparison = ComparisonMode::AverageSegments;
    settings.tick_interval_ms = 40;
    store.save_settings(&settings).unwrap();

    let loaded: Settings = store.load_settings().unwrap();
    let session = SplitSession::with_settings(Arc::new(store.clone()), &loaded);
    assert_eq!(session.comparison(), ComparisonMode::AverageSegments);
    assert_eq!(session.engine().tick_interval(), Duration::from_millis(40));
}

#[test]
fn test_template_listing_and_cascade() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let a = Template::create("A", segments());
    let b = Template::create("B", vec!["Only".into()]);
    store.save_template(&a).unwrap();
    store.save_template(&b).unwrap();
    store.save_attempts(&Attempts::from_template(&a, "A", "Any%")).unwrap();
    store.save_attempts(&Attempts::from_template(&a, "A", "100%")).unwrap();

    assert_eq!(store.list_templates().unwrap().len(), 2);
    assert_eq!(store.list_attempts_for_template(&a.id).unwrap().len(), 2);
    assert!(store.list_attempts_for_template(&b.id).unwrap().is_empty());

    store.delete_template(&a.id).unwrap();
    assert!(store.list_attempts_for_template(&a.id).unwrap().is_empty());
    let remaining = store.list_templates().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, b.id);
}
