//! Single-assignment cell holding a run's outcome.
//!
//! Two event sources race to decide a run: the unit calling its completion handle and the budget timer. Both go
//! through [`OutcomeCell::try_settle`], which is an atomic check-and-set: exactly one caller wins and every later
//! call, including re-entrant ones from inside a completion path, is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::HarnessError;

/// What a run ended with: the unit's result, or the error that terminated it.
pub type RunOutcome = Result<Value, HarnessError>;

#[derive(Default)]
pub struct OutcomeCell {
    settled: AtomicBool,
    slot: Mutex<Option<RunOutcome>>,
    notify: Notify,
}

impl OutcomeCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `outcome` if nothing has been stored yet. Returns whether this call won.
    pub fn try_settle(&self, outcome: RunOutcome) -> bool {
        if self
            .settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        *self.slot.lock() = Some(outcome);
        self.notify.notify_one();
        true
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// Wait for the winning outcome and take it. Only the controller waits, and only once.
    pub async fn settled(&self) -> RunOutcome {
        loop {
            let notified = self.notify.notified();
            if let Some(outcome) = self.slot.lock().take() {
                return outcome;
            }
            notified.await;
        }
    }
}

/// Completion handle given to a unit.
///
/// Cheap to clone; every clone settles the same run. The first settle wins, later ones are ignored and
/// return `false`.
#[derive(Clone)]
pub struct Completion {
    cell: Arc<OutcomeCell>,
}

impl Completion {
    pub(crate) fn new(cell: Arc<OutcomeCell>) -> Self {
        Self { cell }
    }

    /// Report the unit's result. Returns `true` only for the call that decided the run.
    pub fn finish(&self, result: RunOutcome) -> bool {
        let won = self.cell.try_settle(result);
        if !won {
            tracing::debug!("completion called after the run was decided; ignoring");
        }
        won
    }

    pub fn succeed(&self, value: impl Into<Value>) -> bool {
        self.finish(Ok(value.into()))
    }

    /// Report a failure; `message` becomes the run's error verbatim.
    pub fn fail(&self, message: impl std::fmt::Display) -> bool {
        self.finish(Err(HarnessError::unit(message.to_string())))
    }

    /// Whether the run has already been decided, by this handle or the timer.
    pub fn is_done(&self) -> bool {
        self.cell.is_settled()
    }
}
