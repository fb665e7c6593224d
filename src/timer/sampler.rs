//! Background sampler thread that drives periodic ticks while the timer runs

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default interval between ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(15);

/// Handle to a running sampler thread
pub(crate) struct Sampler {
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Sampler {
    /// Spawn a sampler that calls `sample` every `interval` until stopped.
    ///
    /// `sample` receives the running flag so it can drop a snapshot taken
    /// just before a stop request; returning `false` ends the loop.
    pub(crate) fn spawn<F>(interval: Duration, mut sample: F) -> std::io::Result<Self>
    where
        F: FnMut(&AtomicBool) -> bool + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let worker = thread::Builder::new()
            .name("goldsplit-sampler".to_string())
            .spawn(move || {
                log::debug!("Sampler thread started ({:?} interval)", interval);
                while flag.load(Ordering::SeqCst) {
                    thread::park_timeout(interval);
                    if !flag.load(Ordering::SeqCst) {
                        break;
                    }
                    if !sample(&flag) {
                        break;
                    }
                }
                log::debug!("Sampler thread exited");
            })?;

        Ok(Self {
            running,
            worker: Some(worker),
        })
    }

    /// Ask the loop to exit without waiting for it
    pub(crate) fn signal_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = &self.worker {
            worker.thread().unpark();
        }
    }

    /// Stop the loop and wait for the thread to finish.
    ///
    /// When called from the sampler thread itself (a tick callback stopping
    /// the timer) the thread is left to exit on its own.
    pub(crate) fn stop(mut self) {
        self.signal_stop();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                log::warn!("Sampler thread panicked");
            }
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
