//! Notifications emitted by the timer engine

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::state::TimerState;

/// Snapshot of the timer, delivered on every tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TickData {
    pub elapsed_ms: i64,
    pub state: TimerState,
    pub current_segment: usize,
    /// Cumulative split times (0 = skipped)
    pub split_times_ms: Vec<i64>,
    /// Individual segment durations (0 = skipped)
    pub segment_times_ms: Vec<i64>,
    pub split_names: Vec<String>,
}

/// Callback type for tick notifications
pub type TickCallback = Arc<dyn Fn(TickData) + Send + Sync>;

/// Callback type for state changes
pub type StateCallback = Arc<dyn Fn(TimerState) + Send + Sync>;

/// A notification queued while the engine lock is held and delivered after
/// it is released
#[derive(Debug, Clone)]
pub(crate) enum Notification {
    Tick(TickData),
    StateChanged(TimerState),
}

/// Registry of tick and state-change listeners
#[derive(Default)]
pub struct EventHandler {
    tick: Mutex<Vec<TickCallback>>,
    state: Mutex<Vec<StateCallback>>,
}

impl EventHandler {
    /// Create a handler with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tick listener
    pub fn on_tick(&self, callback: TickCallback) {
        self.tick.lock().push(callback);
    }

    /// Add a state-change listener
    pub fn on_state_change(&self, callback: StateCallback) {
        self.state.lock().push(callback);
    }

    /// Deliver a tick to every listener.
    ///
    /// The listener list is cloned first so a callback may register further
    /// listeners or call back into the engine.
    pub fn emit_tick(&self, data: TickData) {
        let callbacks = self.tick.lock().clone();
        for callback in &callbacks {
            callback(data.clone());
        }
    }

    /// Deliver a state change to every listener
    pub fn emit_state(&self, state: TimerState) {
        let callbacks = self.state.lock().clone();
        for callback in &callbacks {
            callback(state);
        }
    }

    pub(crate) fn deliver(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification {
                Notification::Tick(data) => self.emit_tick(data),
                Notification::StateChanged(state) => self.emit_state(state),
            }
        }
    }

    /// Check if there are any listeners
    pub fn has_listeners(&self) -> bool {
        !self.tick.lock().is_empty() || !self.state.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_data_wire_shape() {
        let data = TickData {
            elapsed_ms: 1500,
            state: TimerState::Running,
            current_segment: 1,
            split_times_ms: vec![1000],
            segment_times_ms: vec![1000],
            split_names: vec!["A".into(), "B".into()],
        };

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["elapsedMs"], 1500);
        assert_eq!(json["state"], "running");
        assert_eq!(json["currentSegment"], 1);
        assert_eq!(json["splitTimesMs"][0], 1000);
        assert_eq!(json["segmentTimesMs"][0], 1000);
        assert_eq!(json["splitNames"][1], "B");
    }

    #[test]
    fn test_deliver_in_order() {
        let handler = EventHandler::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        handler.on_tick(Arc::new(move |d| s.lock().push(format!("tick {}", d.elapsed_ms))));
        let s = seen.clone();
        handler.on_state_change(Arc::new(move |st| s.lock().push(format!("state {st}"))));
        assert!(handler.has_listeners());

        handler.deliver(vec![
            Notification::Tick(TickData { elapsed_ms: 7, ..Default::default() }),
            Notification::StateChanged(TimerState::Finished),
        ]);

        assert_eq!(*seen.lock(), vec!["tick 7".to_string(), "state finished".to_string()]);
    }

    #[test]
    fn test_listener_can_register_listener() {
        let handler = Arc::new(EventHandler::new());
        let h = handler.clone();
        handler.on_state_change(Arc::new(move |_| h.on_tick(Arc::new(|_| {}))));

        handler.emit_state(TimerState::Running);
        assert_eq!(handler.tick.lock().len(), 1);
    }
}
