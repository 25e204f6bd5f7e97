//! Debounced write scheduling
//!
//! `WriteSchedule` is the explicit scheduling state behind every debounced
//! write: the instant the next write is due, plus a generation counter for
//! edits and one for what has been written. `AutoSaveWorker` is the
//! background thread that periodically asks its owner to write what is due.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSchedule {
    due_at: Option<Instant>,
    dirty_generation: u64,
    saved_generation: u64,
    in_flight: Option<u64>,
}

impl WriteSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit and push the due time to `now + debounce`.
    pub fn mark_dirty(&mut self, now: Instant, debounce: Duration) {
        self.dirty_generation += 1;
        self.due_at = Some(now + debounce);
    }

    /// Drop the pending timer without writing.
    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    /// Forget every pending edit, e.g. after reloading from storage.
    pub fn reset(&mut self) {
        self.due_at = None;
        self.saved_generation = self.dirty_generation;
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.due_at
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.has_pending_changes() && self.due_at.is_some_and(|due_at| now >= due_at)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.dirty_generation > self.saved_generation
    }

    pub fn is_writing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Claim the current generation for a write and cancel the timer.
    ///
    /// Returns `None` when nothing is pending.
    pub fn begin_write(&mut self) -> Option<u64> {
        if !self.has_pending_changes() {
            return None;
        }

        self.due_at = None;
        self.in_flight = Some(self.dirty_generation);
        Some(self.dirty_generation)
    }

    /// Finish the write started for `generation`.
    ///
    /// Edits made while it was in flight stay pending with their own timer.
    /// A failed write is retried after `retry_after`.
    pub fn finish_write(&mut self, generation: u64, succeeded: bool, now: Instant, retry_after: Duration) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }

        if succeeded {
            self.saved_generation = self.saved_generation.max(generation);
        } else if self.due_at.is_none() {
            self.due_at = Some(now + retry_after);
        }
    }
}

/// Background thread that calls `tick` every `interval` until dropped.
pub struct AutoSaveWorker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl AutoSaveWorker {
    pub fn spawn<F>(interval: Duration, tick: F) -> std::io::Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new().name("guidelens-autosave".to_owned()).spawn(move || {
            debug!(interval_ms = interval.as_millis() as u64, "auto-save started");
            while !thread_stop.load(Ordering::Acquire) {
                tick();
                thread::sleep(interval);
            }
            debug!("auto-save stopped");
        })?;

        Ok(Self { stop, handle: Some(handle) })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AutoSaveWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for AutoSaveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaveWorker").field("running", &self.handle.is_some()).finish()
    }
}
