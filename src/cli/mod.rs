//! CLI module for the unit harness
//!
//! ## Commands
//!
//! - `<input> --unit <name>` - Run a registered unit against an input file (default action)
//! - `units` - List the registered units
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::env;
use std::fmt;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::error::HarnessError;
use crate::units::builtin_registry;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Harness errors raised before a run exists are rendered as miette diagnostics (code and help included).
impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        Self::failure(format!("{:?}", miette::Report::new(err)))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Local test harness for asynchronous units of work
#[derive(Parser, Debug)]
#[command(name = "unit-harness")]
#[command(version = VERSION)]
#[command(about = "Run a unit of work against a mock platform with a size-based time budget", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input file handed to the unit (default action when no subcommand given)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Registered unit to run
    #[arg(long, value_name = "NAME")]
    pub unit: Option<String>,

    /// Size class selecting the time budget (s, m or l)
    #[arg(long, value_name = "SIZE", default_value = "s")]
    pub size: String,

    /// Payload JSON file (default: parameters.json in the current directory)
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// File metadata JSON (file name -> {file_type, file_tags})
    #[arg(long, value_name = "FILE")]
    pub info: Option<PathBuf>,

    /// Existing directory that receives output/ and workFiles/ (default: current directory)
    #[arg(long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Empty output/ and workFiles/ before the run
    #[arg(short = 'o', long)]
    pub overwrite: bool,

    /// Disable colored report output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered units
    Units,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let registry = builtin_registry();

    match cli.command {
        Some(Command::Units) => commands::list_units(&registry),
        None => {
            let Some(input) = cli.input else {
                return Err(CliError::failure("Error: an input file is required (see --help)"));
            };
            let Some(unit) = cli.unit else {
                return Err(CliError::failure(format!(
                    "Error: --unit is required; registered units: {}",
                    registry.names().join(", ")
                )));
            };
            let cwd = env::current_dir()
                .map_err(|e| CliError::failure(format!("Cannot resolve current directory: {e}")))?;
            let args = commands::RunArgs {
                input,
                unit,
                size: cli.size,
                params: cli.params,
                info: cli.info,
                out: cli.out,
                overwrite: cli.overwrite,
                colored: !cli.no_color && std::io::stdout().is_terminal(),
            };
            commands::run_unit(args, &registry, &cwd)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_default_run() {
        let cli = Cli::try_parse_from(["unit-harness", "input.txt", "--unit", "echo"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input.as_deref(), Some(std::path::Path::new("input.txt")));
        assert_eq!(cli.unit.as_deref(), Some("echo"));
        assert_eq!(cli.size, "s");
        assert!(!cli.overwrite);
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::try_parse_from([
            "unit-harness",
            "big.csv",
            "--unit",
            "splitter",
            "--size",
            "L",
            "--params",
            "p.json",
            "--info",
            "i.json",
            "--out",
            "target/run",
            "-o",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.size, "L");
        assert_eq!(cli.params.as_deref(), Some(std::path::Path::new("p.json")));
        assert_eq!(cli.info.as_deref(), Some(std::path::Path::new("i.json")));
        assert_eq!(cli.out.as_deref(), Some(std::path::Path::new("target/run")));
        assert!(cli.overwrite);
        assert!(cli.no_color);
    }

    #[test]
    fn test_cli_parse_units_subcommand() {
        let cli = Cli::try_parse_from(["unit-harness", "units"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Units)));
    }

    #[test]
    fn test_missing_input_is_a_failure() {
        let cli = Cli::try_parse_from(["unit-harness"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("input file is required"));
    }

    #[test]
    fn test_harness_error_becomes_failure_with_message() {
        let err = CliError::from(HarnessError::unit("boom from unit"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("boom from unit"));
    }
}
