#![forbid(unsafe_code)]
//! Unit Harness
//!
//! Local test harness for single-entry asynchronous units of work. A unit is started with a mock platform façade
//! (log, mail, params, id sequence, streams, file metadata) and raced against a per-size time budget. Whichever
//! happens first, the unit completing or the budget expiring, decides the run; the harness then finalizes exactly
//! once: it closes every stream the unit left open, persists the accumulated artifacts, totals and prunes the
//! output, and reports.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Unit panics**: A panic inside a unit is caught at its task boundary and settles the run as a failure; it
//!   never takes the harness down.

pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod report;
pub mod run;
pub mod services;
pub mod tracker;
pub mod unit;
pub mod units;

pub use config::{RunDirs, RunSettings};
pub use error::{HarnessError, HarnessResult};
pub use payload::{FileInfo, FileInfoMap, Payload, UserData};
pub use report::RunReport;
pub use run::{Completion, Controller, RunOutcome};
pub use services::Services;
pub use unit::{Unit, UnitRegistry, unit_fn};
