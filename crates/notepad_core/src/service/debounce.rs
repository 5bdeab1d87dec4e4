//! Generation-counter debouncer for type-as-you-search input.
//!
//! # Responsibility
//! - Run only the last task submitted within one debounce window.
//!
//! # Invariants
//! - Submitting invalidates every earlier pending task; it does not cancel
//!   work that already started running.
//! - Tasks run on a detached thread, never on the submitting thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default window matching interactive-typing latency expectations.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer.
pub struct Debouncer {
    window: Duration,
    generation: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedules `task` to run after the debounce window, unless another
    /// submission supersedes it first.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let window = self.window;

        thread::spawn(move || {
            thread::sleep(window);
            if generation.load(Ordering::SeqCst) == ticket {
                task();
            }
        });
    }

    /// Invalidates every pending task without scheduling a new one.
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
