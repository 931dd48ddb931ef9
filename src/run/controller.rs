//! Harness Controller
//!
//! Owns one run from start to its single report. The unit's entry point runs as a task; the controller then waits
//! for whichever comes first, the unit settling its completion handle or the budget timer, and finalizes exactly
//! once:
//!
//! 1. The outcome cell is settled (the race is decided; façade accumulators close)
//! 2. The elapsed-time clock stops
//! 3. Every tracked stream still open is force-closed
//! 4. Non-empty accumulators are written as artifacts
//! 5. Bytes under the output and working directories are totalled
//! 6. Zero-byte files are pruned from both directories
//! 7. The report is handed back (or to `on_done`)
//!
//! The losing event source is neutralized first: the timer is dropped with the select loop and the unit task is
//! aborted, so nothing can fire after the report exists.

use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use harness_core::{ArtifactKind, SizeClass, artifacts};
use serde::Serialize;
use tokio::task::{JoinError, JoinHandle};

use crate::config::RunSettings;
use crate::error::{HarnessError, HarnessResult};
use crate::payload::{FileInfoMap, Payload};
use crate::report::RunReport;
use crate::services::Services;
use crate::tracker::{prune_zero_byte_files, size_of_directory};
use crate::unit::Unit;

use super::context::RunContext;
use super::outcome::{Completion, RunOutcome};

/// Controller for a single run. Consumed by [`Controller::run`].
pub struct Controller {
    ctx: Arc<RunContext>,
    size: SizeClass,
}

impl Controller {
    /// Prepare a run: resolve directories and open the input stream. No timer exists yet, so a failure here never
    /// leaves anything running.
    pub fn new(settings: &RunSettings, file_info: FileInfoMap) -> HarnessResult<Self> {
        let ctx = RunContext::new(
            settings.dirs(),
            &settings.input_file,
            file_info,
            settings.effective_budget(),
        )?;
        Ok(Self {
            ctx: Arc::new(ctx),
            size: settings.size,
        })
    }

    /// Run `unit` against a fresh façade and return the report once the run is finalized.
    #[tracing::instrument(skip_all, fields(size = %self.size))]
    pub async fn run(self, unit: Arc<dyn Unit>, payload: Payload) -> RunReport {
        let ctx = self.ctx.clone();
        let budget = ctx.clock.budget();
        let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        tracing::info!(budget_ms, "starting run");

        ctx.clock.start();
        let services = Services::new(ctx.clone());
        let done = Completion::new(ctx.outcome.clone());
        let mut unit_task = tokio::spawn(async move { unit.flight(services, payload, done).await });

        let deadline = tokio::time::sleep(budget);
        tokio::pin!(deadline);
        let mut expired = false;
        let mut unit_returned = false;

        let outcome = loop {
            tokio::select! {
                biased;
                outcome = ctx.outcome.settled() => break outcome,
                () = &mut deadline, if !expired => {
                    expired = true;
                    if ctx.outcome.try_settle(Err(HarnessError::TimedOut { budget_ms })) {
                        tracing::warn!(budget_ms, "unit did not complete within its budget");
                    }
                }
                joined = &mut unit_task, if !unit_returned => {
                    unit_returned = true;
                    // A unit that returns without completing may still complete from detached work.
                    if let Err(err) = joined {
                        settle_from_join_error(&ctx, err);
                    }
                }
            }
        };

        unit_task.abort();
        self.finalize(outcome)
    }

    /// Spawn the run and hand its report to `on_done` exactly once.
    pub fn start<F>(self, unit: Arc<dyn Unit>, payload: Payload, on_done: F) -> JoinHandle<()>
    where
        F: FnOnce(RunReport) + Send + 'static,
    {
        tokio::spawn(async move {
            let report = self.run(unit, payload).await;
            on_done(report);
        })
    }

    fn finalize(self, outcome: RunOutcome) -> RunReport {
        let ctx = &self.ctx;
        let elapsed = ctx.clock.stop();

        let closed = ctx.tracker.close_all();
        if closed.closed + closed.failed > 0 {
            tracing::debug!(closed = closed.closed, failed = closed.failed, "force-closed streams");
        }

        let accumulated = ctx.drain();
        let mut artifacts: Vec<PathBuf> = Vec::new();
        let mut artifact_failures: Vec<String> = Vec::new();
        for written in [
            write_artifact(&ctx.dirs.output, ArtifactKind::Log, &accumulated.logs),
            write_artifact(&ctx.dirs.output, ArtifactKind::Mail, &accumulated.mail),
            write_artifact(&ctx.dirs.output, ArtifactKind::Params, &accumulated.params),
        ] {
            match written {
                Ok(Some(path)) => artifacts.push(path),
                Ok(None) => {}
                Err(failure) => artifact_failures.push(failure),
            }
        }

        let total_bytes: u64 = ctx.dirs.all().into_iter().map(size_of_directory).sum();
        let pruned_files: usize = ctx.dirs.all().into_iter().map(prune_zero_byte_files).sum();

        let output_streams_requested = ctx.output_streams_requested();
        if output_streams_requested > 1 {
            tracing::warn!(
                output_streams_requested,
                "more than one write stream requested; make sure to mark the unit as splitter"
            );
        }

        match &outcome {
            Ok(_) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, total_bytes, "run succeeded"),
            Err(err) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, error = %err, "run failed"),
        }

        RunReport {
            size: self.size,
            budget: ctx.clock.budget(),
            elapsed,
            total_bytes,
            output_streams_requested,
            streams_force_closed: closed.closed + closed.failed,
            dropped_appends: ctx.dropped_appends(),
            artifacts,
            artifact_failures,
            pruned_files,
            outcome,
        }
    }
}

fn settle_from_join_error(ctx: &RunContext, err: JoinError) {
    if !err.is_panic() {
        return;
    }
    let message = panic_message(err.into_panic());
    if ctx.outcome.try_settle(Err(HarnessError::unit(format!("unit panicked: {message}")))) {
        tracing::warn!(%message, "unit panicked before completing");
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Write `entries` as the artifact for `kind`. Empty accumulators produce no file; a failed write comes back as a
/// message for the report.
fn write_artifact<T: Serialize>(dir: &Path, kind: ArtifactKind, entries: &[T]) -> Result<Option<PathBuf>, String> {
    if entries.is_empty() {
        return Ok(None);
    }
    let path = dir.join(artifacts::file_name(kind));
    let written = serde_json::to_string_pretty(entries)
        .map_err(|e| e.to_string())
        .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
    match written {
        Ok(()) => Ok(Some(path)),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "could not write artifact");
            Err(format!("{}: {error}", path.display()))
        }
    }
}
