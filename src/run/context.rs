//! Run-scoped state shared by the controller and the façade.
//!
//! Everything a unit can mutate lives here and nowhere else: there is no process-wide state, so independent runs
//! cannot observe each other.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::RunDirs;
use crate::error::{HarnessError, HarnessResult};
use crate::payload::FileInfoMap;
use crate::services::entries::{LogEntry, MailEntry, ParamEntry};
use crate::services::streams::ReadStream;
use crate::tracker::ResourceTracker;

use super::clock::RunClock;
use super::outcome::OutcomeCell;

/// Accumulated façade output, drained once at finalization.
#[derive(Debug, Default)]
pub struct Accumulated {
    pub logs: Vec<LogEntry>,
    pub mail: Vec<MailEntry>,
    pub params: Vec<ParamEntry>,
}

pub struct RunContext {
    pub(crate) outcome: Arc<OutcomeCell>,
    pub(crate) clock: RunClock,
    pub(crate) dirs: RunDirs,
    pub(crate) tracker: ResourceTracker,
    pub(crate) file_info: FileInfoMap,
    pub(crate) input: ReadStream,
    accumulated: Mutex<Accumulated>,
    next_id: AtomicU64,
    output_streams: AtomicUsize,
    dropped_appends: AtomicUsize,
}

impl RunContext {
    /// Build the context and open the input stream. The input stream is tracked like any other.
    pub fn new(dirs: RunDirs, input_file: &Path, file_info: FileInfoMap, budget: Duration) -> HarnessResult<Self> {
        let input = ReadStream::open(input_file)
            .map_err(|e| HarnessError::io(format!("Input file '{}'", input_file.display()), e))?;
        let tracker = ResourceTracker::new();
        tracker.register(input.tracked());

        Ok(Self {
            outcome: Arc::new(OutcomeCell::new()),
            clock: RunClock::new(budget),
            dirs,
            tracker,
            file_info,
            input,
            accumulated: Mutex::new(Accumulated::default()),
            next_id: AtomicU64::new(1),
            output_streams: AtomicUsize::new(0),
            dropped_appends: AtomicUsize::new(0),
        })
    }

    /// Accumulators close the moment the run's outcome is decided.
    pub fn is_closed(&self) -> bool {
        self.outcome.is_settled()
    }

    /// Append to an accumulator unless the run is already decided; late appends are dropped and counted.
    ///
    /// The check happens under the accumulator lock. `drain` only runs after settlement and takes the same lock,
    /// so every append either lands before the drain or is counted as dropped.
    pub(crate) fn append(&self, kind: &'static str, push: impl FnOnce(&mut Accumulated)) {
        let mut accumulated = self.accumulated.lock();
        if self.is_closed() {
            drop(accumulated);
            let dropped = self.dropped_appends.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(kind, dropped, "append after the run was decided; dropping");
            return;
        }
        push(&mut *accumulated);
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Count an output-role stream request; returns the new total.
    pub(crate) fn note_output_stream(&self) -> usize {
        self.output_streams.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn output_streams_requested(&self) -> usize {
        self.output_streams.load(Ordering::Relaxed)
    }

    pub(crate) fn dropped_appends(&self) -> usize {
        self.dropped_appends.load(Ordering::Relaxed)
    }

    /// Take everything accumulated so far, leaving the accumulators empty. Call only once the outcome is settled.
    pub(crate) fn drain(&self) -> Accumulated {
        debug_assert!(self.is_closed(), "accumulators drained before the run was decided");
        std::mem::take(&mut *self.accumulated.lock())
    }
}
