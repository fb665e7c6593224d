//! High-precision split timer
//!
//! All fields live behind one `RwLock`: mutators take the write side,
//! accessors the read side. Notifications produced by a mutator are queued
//! while the lock is held and delivered after it is released, so listeners
//! may call straight back into the engine.

use parking_lot::RwLock;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};
use std::time::{Duration, Instant};

use super::clock::{Clock, SystemClock};
use super::events::{EventHandler, Notification, StateCallback, TickCallback, TickData};
use super::sampler::{Sampler, DEFAULT_TICK_INTERVAL};
use super::state::{TimerAction, TimerState};

/// Mutable timer data guarded by the engine lock
#[derive(Default)]
struct EngineInner {
    state: TimerState,
    start: Option<Instant>,
    pause_started: Option<Instant>,
    paused_total: Duration,
    /// Elapsed time that could not be expressed by back-dating `start`
    carried: Duration,
    segment_names: Vec<String>,
    split_times_ms: Vec<i64>,
    segment_times_ms: Vec<i64>,
    current_segment: usize,
    sampler: Option<Sampler>,
}

impl EngineInner {
    fn measure(&self, until: Instant) -> i64 {
        let Some(start) = self.start else {
            return 0;
        };
        let running = until
            .saturating_duration_since(start)
            .saturating_sub(self.paused_total);
        (running + self.carried).as_millis() as i64
    }

    fn elapsed_ms(&self, now: Instant) -> i64 {
        match self.state {
            TimerState::Idle => 0,
            TimerState::Running => self.measure(now),
            TimerState::Paused => self.measure(self.pause_started.unwrap_or(now)),
            TimerState::Finished => last_recorded(&self.split_times_ms).unwrap_or(0),
        }
    }

    fn tick_data(&self, now: Instant) -> TickData {
        TickData {
            elapsed_ms: self.elapsed_ms(now),
            state: self.state,
            current_segment: self.current_segment,
            split_times_ms: self.split_times_ms.clone(),
            segment_times_ms: self.segment_times_ms.clone(),
            split_names: self.segment_names.clone(),
        }
    }

    fn clear_run(&mut self) {
        self.start = None;
        self.pause_started = None;
        self.paused_total = Duration::ZERO;
        self.carried = Duration::ZERO;
        self.current_segment = 0;
        self.split_times_ms.clear();
        self.segment_times_ms.clear();
    }
}

/// Most recent non-zero cumulative split
fn last_recorded(splits: &[i64]) -> Option<i64> {
    splits.iter().rev().copied().find(|&t| t != 0)
}

/// Side effects that must happen after the engine lock is released
#[derive(Default)]
struct Effects {
    notifications: Vec<Notification>,
    stopped: Option<Sampler>,
}

impl Effects {
    fn tick(&mut self, inner: &EngineInner, now: Instant) {
        self.notifications.push(Notification::Tick(inner.tick_data(now)));
    }

    fn state(&mut self, state: TimerState) {
        self.notifications.push(Notification::StateChanged(state));
    }

    fn stop_sampler(&mut self, inner: &mut EngineInner) {
        if let Some(sampler) = inner.sampler.take() {
            sampler.signal_stop();
            self.stopped = Some(sampler);
        }
    }
}

struct Shared {
    inner: RwLock<EngineInner>,
    clock: Arc<dyn Clock>,
    events: EventHandler,
    tick_interval: Duration,
}

/// Speedrun timer engine.
///
/// Cloning is cheap and every clone drives the same timer.
#[derive(Clone)]
pub struct TimerEngine {
    shared: Arc<Shared>,
}

impl TimerEngine {
    /// Create an engine on the system clock with the default tick interval
    pub fn new(segment_names: Vec<String>) -> Self {
        TimerEngineBuilder::new().segments(segment_names).build()
    }

    /// Start configuring an engine
    pub fn builder() -> TimerEngineBuilder {
        TimerEngineBuilder::new()
    }

    /// Register a tick listener
    pub fn on_tick<F>(&self, callback: F)
    where
        F: Fn(TickData) + Send + Sync + 'static,
    {
        self.shared.events.on_tick(Arc::new(callback));
    }

    /// Register a state-change listener
    pub fn on_state_change<F>(&self, callback: F)
    where
        F: Fn(TimerState) + Send + Sync + 'static,
    {
        self.shared.events.on_state_change(Arc::new(callback));
    }

    /// Interval between background ticks
    pub fn tick_interval(&self) -> Duration {
        self.shared.tick_interval
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Replace the segment list. Ignored unless idle.
    pub fn set_segments(&self, names: Vec<String>) {
        let mut inner = self.shared.inner.write();
        if !inner.state.accepts(TimerAction::SetSegments) {
            return;
        }
        log::debug!("Timer segments set ({} segments)", names.len());
        inner.segment_names = names;
    }

    /// Start a new run. Only valid when idle.
    pub fn start(&self) {
        self.mutate(TimerAction::Start, |engine, inner, now, fx| {
            inner.clear_run();
            inner.start = Some(now);
            engine.start_sampler(inner, fx);
            fx.state(inner.state);
            log::info!("Timer started ({} segments)", inner.segment_names.len());
        });
    }

    /// Record the current elapsed time as the next cumulative split
    pub fn split(&self) {
        self.record_split(TimerAction::Split);
    }

    /// Advance past the current segment without recording a time
    pub fn skip_split(&self) {
        self.record_split(TimerAction::SkipSplit);
    }

    fn record_split(&self, action: TimerAction) {
        self.mutate(action, |_, inner, now, fx| {
            let (cumulative, segment) = if action == TimerAction::SkipSplit {
                (0, 0)
            } else {
                let elapsed = inner.elapsed_ms(now);
                let previous = last_recorded(&inner.split_times_ms).unwrap_or(0);
                (elapsed, elapsed - previous)
            };

            inner.split_times_ms.push(cumulative);
            inner.segment_times_ms.push(segment);
            inner.current_segment += 1;

            log::debug!(
                "Segment {} {} at {} ms",
                inner.current_segment - 1,
                if cumulative == 0 { "skipped" } else { "split" },
                cumulative
            );

            if inner.current_segment >= inner.segment_names.len() {
                inner.state = TimerState::Finished;
                fx.stop_sampler(inner);
                fx.tick(inner, now);
                fx.state(inner.state);
                log::info!("Run finished at {} ms", inner.elapsed_ms(now));
            }
        });
    }

    /// Revert the last split. No-op if nothing has been split yet.
    pub fn undo_split(&self) {
        self.mutate(TimerAction::UndoSplit, |_, inner, now, fx| {
            if inner.current_segment == 0 || inner.split_times_ms.is_empty() {
                return;
            }
            inner.split_times_ms.pop();
            inner.segment_times_ms.pop();
            inner.current_segment -= 1;
            fx.tick(inner, now);
            log::debug!("Undo split, back to segment {}", inner.current_segment);
        });
    }

    /// Freeze the timer
    pub fn pause(&self) {
        self.mutate(TimerAction::Pause, |_, inner, now, fx| {
            inner.pause_started = Some(now);
            fx.stop_sampler(inner);
            fx.state(inner.state);
            log::info!("Timer paused at {} ms", inner.elapsed_ms(now));
        });
    }

    /// Continue after a pause; paused time is excluded from elapsed time
    pub fn resume(&self) {
        self.mutate(TimerAction::Resume, |engine, inner, now, fx| {
            if let Some(paused_at) = inner.pause_started.take() {
                inner.paused_total += now.saturating_duration_since(paused_at);
            }
            engine.start_sampler(inner, fx);
            fx.state(inner.state);
            log::info!("Timer resumed at {} ms", inner.elapsed_ms(now));
        });
    }

    /// Rebuild a paused run that had been going for `elapsed_ms`.
    ///
    /// Only valid when idle. A later [`resume`](Self::resume) continues the
    /// run from exactly `elapsed_ms`.
    pub fn restore(
        &self,
        elapsed_ms: i64,
        current_segment: usize,
        split_times_ms: Vec<i64>,
        segment_times_ms: Vec<i64>,
    ) {
        self.mutate(TimerAction::Restore, move |_, inner, now, fx| {
            let elapsed = Duration::from_millis(elapsed_ms.max(0) as u64);
            inner.clear_run();

            match now.checked_sub(elapsed) {
                Some(start) => inner.start = Some(start),
                None => {
                    inner.start = Some(now);
                    inner.carried = elapsed;
                }
            }
            inner.pause_started = Some(now);
            inner.current_segment = current_segment;
            inner.split_times_ms = split_times_ms;
            inner.segment_times_ms = segment_times_ms;

            fx.tick(inner, now);
            fx.state(inner.state);
            log::info!(
                "Timer restored at {} ms, segment {}",
                elapsed_ms,
                current_segment
            );
        });
    }

    /// Abandon the run and return to idle
    pub fn reset(&self) {
        self.mutate(TimerAction::Reset, |_, inner, now, fx| {
            fx.stop_sampler(inner);
            inner.clear_run();
            fx.tick(inner, now);
            fx.state(inner.state);
            log::info!("Timer reset");
        });
    }

    /// Move to the state the transition table gives for `action` and run
    /// `apply` under the write lock, then release the lock, join any stopped
    /// sampler, and deliver notifications. Inert actions do nothing.
    fn mutate<F>(&self, action: TimerAction, apply: F)
    where
        F: FnOnce(&Self, &mut EngineInner, Instant, &mut Effects),
    {
        let mut fx = Effects::default();
        {
            let mut inner = self.shared.inner.write();
            let Some(next) = inner.state.next(action) else {
                log::trace!("Ignoring {:?} while {}", action, inner.state);
                return;
            };
            inner.state = next;
            let now = self.shared.clock.now();
            apply(self, &mut *inner, now, &mut fx);
        }

        if let Some(sampler) = fx.stopped.take() {
            sampler.stop();
        }
        self.shared.events.deliver(fx.notifications);
    }

    fn start_sampler(&self, inner: &mut EngineInner, fx: &mut Effects) {
        fx.stop_sampler(inner);

        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let spawned = Sampler::spawn(self.shared.tick_interval, move |running: &AtomicBool| {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let data = {
                let inner = shared.inner.read();
                inner.tick_data(shared.clock.now())
            };
            if running.load(Ordering::SeqCst) {
                shared.events.emit_tick(data);
            }
            true
        });

        match spawned {
            Ok(sampler) => inner.sampler = Some(sampler),
            Err(e) => log::error!("Failed to spawn sampler thread: {}", e),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current state
    pub fn state(&self) -> TimerState {
        self.shared.inner.read().state
    }

    /// Elapsed run time in milliseconds, excluding paused time
    pub fn elapsed_ms(&self) -> i64 {
        let inner = self.shared.inner.read();
        inner.elapsed_ms(self.shared.clock.now())
    }

    /// Full snapshot as delivered to tick listeners
    pub fn tick_data(&self) -> TickData {
        let inner = self.shared.inner.read();
        inner.tick_data(self.shared.clock.now())
    }

    /// Copy of the cumulative split times recorded so far
    pub fn split_times_ms(&self) -> Vec<i64> {
        self.shared.inner.read().split_times_ms.clone()
    }

    /// Copy of the per-segment durations recorded so far
    pub fn segment_times_ms(&self) -> Vec<i64> {
        self.shared.inner.read().segment_times_ms.clone()
    }

    /// Index of the segment currently being timed
    pub fn current_segment(&self) -> usize {
        self.shared.inner.read().current_segment
    }

    /// Copy of the working segment names
    pub fn segment_names(&self) -> Vec<String> {
        self.shared.inner.read().segment_names.clone()
    }

    /// Whether the background sampler is active
    pub fn is_sampling(&self) -> bool {
        self.shared.inner.read().sampler.is_some()
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Builder for [`TimerEngine`]
pub struct TimerEngineBuilder {
    segment_names: Vec<String>,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    tick_callbacks: Vec<TickCallback>,
    state_callbacks: Vec<StateCallback>,
}

impl TimerEngineBuilder {
    pub fn new() -> Self {
        Self {
            segment_names: Vec::new(),
            clock: Arc::new(SystemClock),
            tick_interval: DEFAULT_TICK_INTERVAL,
            tick_callbacks: Vec::new(),
            state_callbacks: Vec::new(),
        }
    }

    pub fn segments(mut self, names: Vec<String>) -> Self {
        self.segment_names = names;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn on_tick<F>(mut self, callback: F) -> Self
    where
        F: Fn(TickData) + Send + Sync + 'static,
    {
        self.tick_callbacks.push(Arc::new(callback));
        self
    }

    pub fn on_state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(TimerState) + Send + Sync + 'static,
    {
        self.state_callbacks.push(Arc::new(callback));
        self
    }

    pub fn build(self) -> TimerEngine {
        let events = EventHandler::new();
        for callback in self.tick_callbacks {
            events.on_tick(callback);
        }
        for callback in self.state_callbacks {
            events.on_state_change(callback);
        }

        TimerEngine {
            shared: Arc::new(Shared {
                inner: RwLock::new(EngineInner {
                    segment_names: self.segment_names,
                    ..Default::default()
                }),
                clock: self.clock,
                events,
                tick_interval: self.tick_interval,
            }),
        }
    }
}

impl Default for TimerEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
