//! A timer wired to an attempt history and a persistence collaborator
//!
//! `SplitSession` is the single in-process owner of a run: it translates user
//! actions into engine calls, records attempts when a run ends, and computes
//! live deltas against the configured comparison.

use std::sync::Arc;

use crate::persist::{RunStore, Settings, SuspendedRun};
use crate::split::{Attempts, ComparisonMode, Delta};
use crate::timer::{TimerEngine, TimerState};
use crate::{Result, SplitError};

/// User-facing actions, typically bound to hotkeys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Start when idle, split when running
    StartSplit,
    /// Pause when running, resume when paused
    Pause,
    Reset,
    UndoSplit,
    SkipSplit,
}

/// Owns one timer engine and the active attempt history
pub struct SplitSession {
    engine: TimerEngine,
    store: Arc<dyn RunStore>,
    attempts: Option<Attempts>,
    comparison: ComparisonMode,
}

impl SplitSession {
    pub fn new(engine: TimerEngine, store: Arc<dyn RunStore>) -> Self {
        Self {
            engine,
            store,
            attempts: None,
            comparison: ComparisonMode::default(),
        }
    }

    /// Build a session whose engine and comparison follow `settings`
    pub fn with_settings(store: Arc<dyn RunStore>, settings: &Settings) -> Self {
        let engine = TimerEngine::builder()
            .tick_interval(settings.tick_interval())
            .build();
        let mut session = Self::new(engine, store);
        session.comparison = settings.comparison;
        session
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn attempts(&self) -> Option<&Attempts> {
        self.attempts.as_ref()
    }

    pub fn comparison(&self) -> ComparisonMode {
        self.comparison
    }

    pub fn set_comparison(&mut self, mode: ComparisonMode) {
        self.comparison = mode;
    }

    /// Make `attempts` the active history and load its segments into the
    /// engine. Refused while a run is in progress.
    pub fn set_attempts(&mut self, attempts: Attempts) -> bool {
        if self.engine.state() != TimerState::Idle {
            log::warn!("Cannot switch attempts while the timer is {}", self.engine.state());
            return false;
        }

        self.engine.set_segments(attempts.segment_names());
        log::info!(
            "Active attempts: {} / {} ({} segments)",
            attempts.name,
            attempts.category_name,
            attempts.segment_count()
        );
        self.attempts = Some(attempts);
        true
    }

    /// Drop the active history without touching the timer
    pub fn clear_attempts(&mut self) -> Option<Attempts> {
        self.attempts.take()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        log::trace!("Dispatching {:?}", action);
        match action {
            Action::StartSplit => self.start_split(),
            Action::Pause => {
                self.toggle_pause();
                Ok(())
            }
            Action::Reset => self.reset(),
            Action::UndoSplit => {
                self.undo_split();
                Ok(())
            }
            Action::SkipSplit => self.skip_split(),
        }
    }

    /// Start when idle, split when running; ignored otherwise
    pub fn start_split(&mut self) -> Result<()> {
        match self.engine.state() {
            TimerState::Idle => {
                self.engine.start();
                Ok(())
            }
            TimerState::Running => {
                self.engine.split();
                self.check_completion()
            }
            TimerState::Paused | TimerState::Finished => Ok(()),
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.engine.state() {
            TimerState::Running => self.engine.pause(),
            TimerState::Paused => self.engine.resume(),
            TimerState::Idle | TimerState::Finished => {}
        }
    }

    pub fn undo_split(&mut self) {
        self.engine.undo_split();
    }

    pub fn skip_split(&mut self) -> Result<()> {
        if self.engine.state() != TimerState::Running {
            return Ok(());
        }
        self.engine.skip_split();
        self.check_completion()
    }

    /// Return to idle. A run that had not finished is recorded as an
    /// incomplete attempt; finished runs were recorded on completion.
    /// Any suspended run is cleared.
    pub fn reset(&mut self) -> Result<()> {
        let state = self.engine.state();
        if state == TimerState::Idle {
            return Ok(());
        }

        let recorded = if state != TimerState::Finished {
            self.record_attempt(false)
        } else {
            Ok(())
        };

        self.engine.reset();
        let cleared = self.store.delete_suspended_run();
        recorded.and(cleared)
    }

    /// Drop the attempt recorded for a just-finished run and reset.
    /// Returns `false` unless the timer is finished.
    pub fn discard_attempt(&mut self) -> Result<bool> {
        if self.engine.state() != TimerState::Finished {
            return Ok(false);
        }

        let mut saved = Ok(());
        if let Some(attempts) = self.attempts.as_mut() {
            if let Some(dropped) = attempts.discard_latest() {
                log::info!("Discarded attempt #{}", dropped.id);
                saved = self.store.save_attempts(attempts);
            }
        }

        self.engine.reset();
        saved.map(|_| true)
    }

    /// Live deltas of the current run against the configured comparison
    pub fn deltas(&self) -> Vec<Delta> {
        match &self.attempts {
            Some(attempts) => attempts.split_deltas(&self.engine.split_times_ms(), self.comparison),
            None => Vec::new(),
        }
    }

    // =========================================================================
    // History edits
    // =========================================================================

    /// Remove an attempt from the active history and persist it
    pub fn delete_attempt(&mut self, attempt_id: u32) -> Result<bool> {
        self.edit_history(|attempts| attempts.delete_attempt(attempt_id))
    }

    /// Replace an attempt's splits in the active history and persist it
    pub fn edit_attempt_splits(&mut self, attempt_id: u32, split_times_ms: Vec<i64>) -> Result<bool> {
        self.edit_history(|attempts| attempts.edit_attempt_splits(attempt_id, split_times_ms))
    }

    /// Interpolate an attempt's bounded gaps and persist the result
    pub fn estimate_gaps(&mut self, attempt_id: u32) -> Result<bool> {
        self.edit_history(|attempts| attempts.estimate_gaps(attempt_id))
    }

    fn edit_history<F>(&mut self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut Attempts) -> bool,
    {
        let attempts = self.attempts.as_mut().ok_or(SplitError::NoActiveAttempts)?;
        if !edit(attempts) {
            return Ok(false);
        }

        self.store.save_attempts(attempts)?;
        Ok(true)
    }

    // =========================================================================
    // Suspension
    // =========================================================================

    /// Save the in-progress run so it can be resumed later, then return the
    /// timer to idle without recording an attempt.
    ///
    /// Returns `false` when there is no running or paused run to save.
    pub fn suspend(&mut self) -> Result<bool> {
        let Some(attempts) = self.attempts.as_ref() else {
            return Ok(false);
        };
        if !self.engine.state().is_active() {
            return Ok(false);
        }

        self.engine.pause();
        let run = SuspendedRun::from_tick(&attempts.template_id, &attempts.id, &self.engine.tick_data());
        self.store.save_suspended_run(&run)?;

        self.engine.reset();
        Ok(true)
    }

    /// Restore a suspended run for the active attempts into a paused timer.
    ///
    /// Returns `false` when nothing is suspended, the record belongs to other
    /// attempts, or the timer is busy.
    pub fn resume_suspended(&mut self) -> Result<bool> {
        let attempts = self.attempts.as_ref().ok_or(SplitError::NoActiveAttempts)?;
        let Some(run) = self.store.load_suspended_run()? else {
            return Ok(false);
        };

        if run.attempts_id != attempts.id {
            log::warn!(
                "Suspended run belongs to attempts {}, not {}",
                run.attempts_id,
                attempts.id
            );
            return Ok(false);
        }
        if self.engine.state() != TimerState::Idle {
            return Ok(false);
        }

        self.engine.restore(
            run.elapsed_ms,
            run.current_segment,
            run.split_times_ms,
            run.segment_times_ms,
        );
        self.store.delete_suspended_run()?;
        Ok(true)
    }

    // =========================================================================
    // Recording
    // =========================================================================

    fn check_completion(&mut self) -> Result<()> {
        if self.engine.state() != TimerState::Finished {
            return Ok(());
        }

        let splits = self.engine.split_times_ms();
        let completed = splits.last().is_some_and(|&t| t > 0);
        self.record_attempt(completed)?;
        self.store.delete_suspended_run()
    }

    fn record_attempt(&mut self, completed: bool) -> Result<()> {
        let Some(attempts) = self.attempts.as_mut() else {
            log::debug!("No active attempts, run not recorded");
            return Ok(());
        };

        attempts.add_attempt(self.engine.split_times_ms(), completed);
        self.store.save_attempts(attempts)
    }
}
