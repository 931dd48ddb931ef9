//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::path::{Path, PathBuf};

use harness_core::SizeClass;

use crate::config::{RunSettings, validate_output_root};
use crate::error::HarnessError;
use crate::payload::{load_file_info, load_payload};
use crate::report::RunReport;
use crate::run::Controller;
use crate::unit::UnitRegistry;

use super::{CliError, CliResult, ExitCode};

/// Arguments of the default run action, already separated from clap.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub input: PathBuf,
    pub unit: String,
    pub size: String,
    pub params: Option<PathBuf>,
    pub info: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub overwrite: bool,
    pub colored: bool,
}

/// Run one unit end to end and print its report.
///
/// Everything that can be rejected up front (size, unit name, payload and info files, output root, input file)
/// is checked before the controller exists, so no timer is ever started for an invalid invocation. Relative
/// paths resolve against `cwd`.
pub fn run_unit(args: RunArgs, registry: &UnitRegistry, cwd: &Path) -> CliResult<ExitCode> {
    let report = execute_run(args.clone(), registry, cwd)?;
    println!("{}", report.render(args.colored));

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // The report already carries the reason
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Validate the invocation, run the unit on a single-threaded runtime and return the report.
pub fn execute_run(args: RunArgs, registry: &UnitRegistry, cwd: &Path) -> CliResult<RunReport> {
    let resolve = |path: PathBuf| if path.is_absolute() { path } else { cwd.join(path) };

    let size: SizeClass = args.size.parse().map_err(HarnessError::from)?;
    let unit = registry.resolve(&args.unit)?;

    let params = args.params.map(resolve);
    let info = args.info.map(resolve);
    let file_info = load_file_info(info.as_deref())?;

    let root = args.out.map(resolve).unwrap_or_else(|| cwd.to_path_buf());
    validate_output_root(&root)?;

    let settings = RunSettings::new(resolve(args.input))
        .with_size(size)
        .with_output_root(root)
        .with_overwrite(args.overwrite);
    settings.dirs().bootstrap(settings.overwrite)?;

    if !settings.input_file.is_file() {
        return Err(CliError::failure(format!(
            "Input file '{}' doesn't exist",
            settings.input_file.display()
        )));
    }

    let payload = load_payload(params.as_deref(), cwd)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::failure(format!("Cannot start async runtime: {e}")))?;

    tracing::debug!(unit = %args.unit, size = %size, input = %settings.input_file.display(), "running unit");
    let controller = Controller::new(&settings, file_info)?;
    Ok(runtime.block_on(controller.run(unit, payload)))
}

/// Print the registered unit names, one per line.
pub fn list_units(registry: &UnitRegistry) -> CliResult<ExitCode> {
    for name in registry.names() {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::units::builtin_registry;

    fn args(input: &str, unit: &str) -> RunArgs {
        RunArgs {
            input: PathBuf::from(input),
            unit: unit.to_string(),
            size: "s".to_string(),
            params: None,
            info: None,
            out: None,
            overwrite: false,
            colored: false,
        }
    }

    #[test]
    fn test_echo_run_succeeds_and_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.txt"), "hello harness").unwrap();

        let report = execute_run(args("input.txt", "echo"), &builtin_registry(), dir.path()).unwrap();
        assert!(report.is_success());
        let copied = fs::read_to_string(dir.path().join("output").join("echo_output")).unwrap();
        assert_eq!(copied, "hello harness");
        assert!(dir.path().join("output").join("unitlog.json").is_file());
        assert!(dir.path().join("workFiles").is_dir());
    }

    #[test]
    fn test_invalid_size_fails_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = args("input.txt", "echo");
        bad.size = "xl".to_string();

        let err = execute_run(bad, &builtin_registry(), dir.path()).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("'xl' is not a valid size, must be one of [s, m, l]"));
        assert!(!dir.path().join("output").exists());
    }

    #[test]
    fn test_unknown_unit_fails_before_run() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute_run(args("input.txt", "nope"), &builtin_registry(), dir.path()).unwrap_err();
        assert!(err.message.contains("It was not possible to load the unit 'nope'"));
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = execute_run(args("absent.txt", "echo"), &builtin_registry(), dir.path()).unwrap_err();
        assert!(err.message.starts_with("Input file '"));
        assert!(err.message.ends_with("absent.txt' doesn't exist"));
    }

    #[test]
    fn test_unknown_output_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.txt"), "x").unwrap();
        let mut bad = args("input.txt", "echo");
        bad.out = Some(PathBuf::from("missing_root"));

        let err = execute_run(bad, &builtin_registry(), dir.path()).unwrap_err();
        assert!(err.message.contains("is unknown"));
    }

    #[test]
    fn test_missing_params_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.txt"), "x").unwrap();
        let mut bad = args("input.txt", "echo");
        bad.params = Some(PathBuf::from("params.json"));

        let err = execute_run(bad, &builtin_registry(), dir.path()).unwrap_err();
        assert!(err.message.contains("params.json doesn't exist"));
    }

    #[test]
    fn test_overwrite_empties_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("input.txt"), "a\nb\nc\n").unwrap();
        fs::create_dir_all(dir.path().join("output")).unwrap();
        fs::write(dir.path().join("output").join("stale.txt"), "old").unwrap();

        let mut run = args("input.txt", "splitter");
        run.overwrite = true;
        let report = execute_run(run, &builtin_registry(), dir.path()).unwrap();

        assert!(report.is_success());
        assert!(report.multiple_output_streams());
        assert!(!dir.path().join("output").join("stale.txt").exists());
        let even = fs::read_to_string(dir.path().join("output").join("even_lines")).unwrap();
        assert_eq!(even, "a\nc\n");
    }

    #[test]
    fn test_list_units_succeeds() {
        assert_eq!(list_units(&builtin_registry()).unwrap(), ExitCode::SUCCESS);
    }
}
