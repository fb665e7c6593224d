//! Timer state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current phase of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Not started, or reset
    #[default]
    Idle,
    /// Actively counting
    Running,
    /// Paused mid-run
    Paused,
    /// Every segment has been split
    Finished,
}

/// User-facing operations on the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerAction {
    Start,
    Split,
    SkipSplit,
    UndoSplit,
    Pause,
    Resume,
    Restore,
    Reset,
    SetSegments,
}

impl TimerState {
    /// Look up the transition table.
    ///
    /// Returns the state an action moves to, or `None` when the action is
    /// inert in this state. A split that completes the final segment still
    /// reports `Running` here; the engine promotes it to `Finished` once it
    /// knows the cursor reached the end.
    pub fn next(self, action: TimerAction) -> Option<TimerState> {
        use TimerAction as A;
        use TimerState as S;

        match (self, action) {
            (S::Idle, A::Start) => Some(S::Running),
            (S::Idle, A::Restore) => Some(S::Paused),
            (S::Idle, A::SetSegments) => Some(S::Idle),
            (S::Idle, A::Reset) => None,

            (S::Running, A::Split | A::SkipSplit | A::UndoSplit) => Some(S::Running),
            (S::Running, A::Pause) => Some(S::Paused),
            (S::Paused, A::Resume) => Some(S::Running),

            (_, A::Reset) => Some(S::Idle),
            _ => None,
        }
    }

    /// Whether the action does anything in this state
    pub fn accepts(self, action: TimerAction) -> bool {
        self.next(action).is_some()
    }

    /// Wire name used in tick payloads
    pub fn as_str(self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
        }
    }

    /// Whether a run is in progress (running or paused)
    pub fn is_active(self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
