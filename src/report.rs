//! Final report for a run.
//!
//! The report is assembled once, at finalization, and is the only thing a caller gets back from a run. Rendering
//! is plain text with optional ANSI colors.

use std::path::PathBuf;
use std::time::Duration;

use harness_core::SizeClass;
use harness_core::defaults::SIZE_WARNING_BYTES;

use crate::run::RunOutcome;

const BANNER: &str = "==========================================";

#[derive(Debug)]
pub struct RunReport {
    pub size: SizeClass,
    /// Working time the unit was given
    pub budget: Duration,
    /// Time from start until finalization stopped the clock
    pub elapsed: Duration,
    /// Bytes under the output and working directories after finalization
    pub total_bytes: u64,
    /// Output-role streams the unit requested
    pub output_streams_requested: usize,
    /// Streams finalization had to close on the unit's behalf
    pub streams_force_closed: usize,
    /// Façade appends refused because the run was already decided
    pub dropped_appends: usize,
    /// Artifacts written to the output directory
    pub artifacts: Vec<PathBuf>,
    /// Artifacts that could not be written, as `<path>: <error>`
    pub artifact_failures: Vec<String>,
    /// Zero-byte files removed from the tracked directories
    pub pruned_files: usize,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn timed_out(&self) -> bool {
        self.outcome.as_ref().is_err_and(|err| err.is_timeout())
    }

    /// Output at or above 512 MiB.
    pub fn size_warning(&self) -> bool {
        self.total_bytes >= SIZE_WARNING_BYTES
    }

    /// Advisory: more than one output stream suggests the unit should be declared a splitter.
    pub fn multiple_output_streams(&self) -> bool {
        self.output_streams_requested > 1
    }

    /// Human-readable summary.
    pub fn render(&self, colored: bool) -> String {
        let paint = |code: &str, text: String| {
            if colored {
                format!("\x1b[{code}m{text}\x1b[0m")
            } else {
                text
            }
        };

        let mut lines = vec![BANNER.to_string(), "Unit test result completed".to_string(), BANNER.to_string()];
        match &self.outcome {
            Ok(_) => {
                lines.push(format!("status: {}", paint("32", "Success".to_string())));
                lines.push(format!("instance: {}", self.size));
                lines.push(format!("time: {}ms", paint("32", self.elapsed.as_millis().to_string())));
            }
            Err(err) => {
                lines.push(format!("status: {}", paint("31", "Failure".to_string())));
                lines.push(format!("reason: {err}"));
                lines.push(format!("instance: {}", self.size));
                lines.push(format!("time: {}ms", self.elapsed.as_millis()));
            }
        }
        let space = if self.size_warning() {
            format!("{} bytes --->WARNING", paint("31", self.total_bytes.to_string()))
        } else if self.is_success() {
            format!("{} bytes", paint("32", self.total_bytes.to_string()))
        } else {
            format!("{} bytes", self.total_bytes)
        };
        lines.push(format!("space: {space}"));

        if self.multiple_output_streams() {
            lines.push(paint(
                "33",
                format!(
                    "*More than one write stream requested ({}), make sure to mark the unit as splitter.",
                    self.output_streams_requested
                ),
            ));
        }
        for failure in &self.artifact_failures {
            lines.push(paint("31", format!("*Could not write artifact {failure}")));
        }
        if self.dropped_appends > 0 {
            lines.push(paint(
                "33",
                format!("*{} late log/mail/param call(s) ignored after the run ended.", self.dropped_appends),
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use serde_json::Value;

    fn report(outcome: RunOutcome) -> RunReport {
        RunReport {
            size: SizeClass::Small,
            budget: Duration::from_millis(25_000),
            elapsed: Duration::from_millis(1_234),
            total_bytes: 2_048,
            output_streams_requested: 1,
            streams_force_closed: 0,
            dropped_appends: 0,
            artifacts: Vec::new(),
            artifact_failures: Vec::new(),
            pruned_files: 0,
            outcome,
        }
    }

    #[test]
    fn test_render_success() {
        let text = report(Ok(Value::Null)).render(false);
        insta::assert_snapshot!(text, @r"
        ==========================================
        Unit test result completed
        ==========================================
        status: Success
        instance: s
        time: 1234ms
        space: 2048 bytes
        ");
    }

    #[test]
    fn test_render_failure_with_advisories() {
        let mut failed = report(Err(HarnessError::TimedOut { budget_ms: 25_000 }));
        failed.output_streams_requested = 2;
        failed.dropped_appends = 3;
        assert!(failed.timed_out());
        insta::assert_snapshot!(failed.render(false), @r"
        ==========================================
        Unit test result completed
        ==========================================
        status: Failure
        reason: Timed-out after 25000ms
        instance: s
        time: 1234ms
        space: 2048 bytes
        *More than one write stream requested (2), make sure to mark the unit as splitter.
        *3 late log/mail/param call(s) ignored after the run ended.
        ");
    }

    #[test]
    fn test_size_warning_threshold_is_inclusive() {
        let mut big = report(Ok(Value::Null));
        big.total_bytes = SIZE_WARNING_BYTES - 1;
        assert!(!big.size_warning());
        big.total_bytes = SIZE_WARNING_BYTES;
        assert!(big.size_warning());
        assert!(big.render(false).ends_with("536870912 bytes --->WARNING"));
    }

    #[test]
    fn test_failure_keeps_size_warning() {
        let mut failed = report(Err(HarnessError::unit("bad row")));
        failed.total_bytes = SIZE_WARNING_BYTES;
        assert!(failed.render(false).contains("space: 536870912 bytes --->WARNING"));
    }

    #[test]
    fn test_artifact_failures_are_listed() {
        let mut partial = report(Ok(Value::Null));
        partial.artifact_failures.push("output/unitlog.json: Is a directory (os error 21)".to_string());
        assert!(
            partial
                .render(false)
                .ends_with("*Could not write artifact output/unitlog.json: Is a directory (os error 21)")
        );
    }

    #[test]
    fn test_colored_render_wraps_status() {
        let text = report(Ok(Value::Null)).render(true);
        assert!(text.contains("\x1b[32mSuccess\x1b[0m"));
    }
}
