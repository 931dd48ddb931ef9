//! Elapsed-time clock for a run.
//!
//! Uses `tokio::time::Instant` so a paused test runtime drives it deterministically.

use std::sync::OnceLock;
use std::time::Duration;

use tokio::time::Instant;

pub struct RunClock {
    budget: Duration,
    started: OnceLock<Instant>,
    stopped: OnceLock<Duration>,
}

impl RunClock {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            started: OnceLock::new(),
            stopped: OnceLock::new(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Start counting. Only the first call has an effect.
    pub fn start(&self) {
        let _ = self.started.set(Instant::now());
    }

    /// Freeze the clock and return the final elapsed time. Later calls return the same value.
    pub fn stop(&self) -> Duration {
        *self.stopped.get_or_init(|| self.running_elapsed())
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped.get().copied().unwrap_or_else(|| self.running_elapsed())
    }

    /// Budget left; saturates at zero rather than going negative.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    fn running_elapsed(&self) -> Duration {
        self.started.get().map(Instant::elapsed).unwrap_or_default()
    }
}
