//! Timer engine
//!
//! This module contains the live stopwatch side of the crate:
//! - `TimerEngine` - Thread-safe split timer with pause/resume and restore
//! - `TimerState` - Idle/Running/Paused/Finished state machine
//! - `TickData` - Snapshot delivered to listeners on every tick
//! - `Clock` - Time source abstraction (system or manual)

mod clock;
mod engine;
mod events;
mod sampler;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{TimerEngine, TimerEngineBuilder};
pub use events::{EventHandler, StateCallback, TickCallback, TickData};
pub use sampler::DEFAULT_TICK_INTERVAL;
pub use state::{TimerAction, TimerState};
