//! Error taxonomy for a harness run.
//!
//! Every variant terminates the run it occurs in; there is no retry anywhere in the harness. Messages are
//! user-facing and surfaced verbatim by the CLI.

use std::io;
use std::path::PathBuf;

use harness_core::ParseSizeError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    /// The time budget elapsed before the unit reported completion.
    #[error("Timed-out after {budget_ms}ms")]
    #[diagnostic(
        code(harness::timed_out),
        help("the unit must call its completion handle before the budget runs out; try a larger --size")
    )]
    TimedOut { budget_ms: u64 },

    /// The unit asked for a write stream named like a harness-owned artifact.
    #[error("Attempted to use reserved file name '{name}'")]
    #[diagnostic(code(harness::reserved_name))]
    ReservedName { name: String },

    /// The unit asked for a stream whose name is not a single plain file name.
    #[error("Stream name '{name}' must be a plain file name")]
    #[diagnostic(code(harness::invalid_stream_name), help("path separators, '.' and '..' are not allowed"))]
    InvalidStreamName { name: String },

    /// A stream was requested after the run's outcome was already decided.
    #[error("The run has already finalized")]
    #[diagnostic(code(harness::run_finalized))]
    RunFinalized,

    /// The requested unit is not registered.
    #[error("It was not possible to load the unit '{name}'")]
    #[diagnostic(code(harness::unit_load), help("registered units: {available}"))]
    UnitLoad { name: String, available: String },

    /// Error reported by the unit through its completion handle.
    #[error("{message}")]
    #[diagnostic(code(harness::unit))]
    Unit { message: String },

    #[error(transparent)]
    #[diagnostic(code(harness::invalid_size))]
    InvalidSize(#[from] ParseSizeError),

    #[error("{} doesn't exist", .path.display())]
    #[diagnostic(code(harness::missing_file))]
    MissingFile { path: PathBuf },

    #[error("{} is not a valid JSON file", .path.display())]
    #[diagnostic(code(harness::invalid_json))]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON whose shape does not fit the payload.
    #[error("{} is not a valid parameter file: {source}", .path.display())]
    #[diagnostic(
        code(harness::invalid_parameters),
        help("expected an object with optional integrations, parameters, flightprocessing and user_data")
    )]
    InvalidParameters {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} {reason}", .path.display())]
    #[diagnostic(code(harness::invalid_output_root), help("--out must name an existing directory"))]
    InvalidOutputRoot { path: PathBuf, reason: &'static str },

    #[error("{context}: {source}")]
    #[diagnostic(code(harness::io))]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl HarnessError {
    /// Wrap a message reported by a unit.
    pub fn unit(message: impl Into<String>) -> Self {
        HarnessError::Unit {
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        HarnessError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::TimedOut { .. })
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;
