//! Goldsplit Core
//!
//! A speedrun split timer with attempt history and live comparisons.
//!
//! The crate is split into:
//! - `timer` - Thread-safe timer engine with pause/resume, skip, undo and restore
//! - `split` - Templates, attempt history, comparison series, gap estimation and deltas
//! - `persist` - JSON/TOML persistence of templates, attempts, settings and suspended runs
//! - `session` - Wires a timer to an attempt history and a store

pub mod error;
pub mod persist;
pub mod session;
pub mod split;
pub mod timer;

// Re-export commonly used types
pub use error::{Result, SplitError};
pub use persist::{FileStore, RunStore, Settings, SuspendedRun};
pub use session::{Action, SplitSession};
pub use split::{compute_delta, compute_split_deltas, Attempt, Attempts, ComparisonMode, Delta, Segment, Template};
pub use timer::{Clock, ManualClock, SystemClock, TickData, TimerEngine, TimerState};
