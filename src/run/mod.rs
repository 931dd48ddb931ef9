//! Run lifecycle: the controller, its outcome cell and clock.
//!
//! ## Modules
//!
//! - `controller` - the timer/completion race and exactly-once finalization
//! - `outcome` - single-assignment outcome cell and the unit's completion handle
//! - `clock` - elapsed/remaining time for a run
//! - `context` - run-scoped state shared with the façade

pub mod clock;
pub(crate) mod context;
pub mod controller;
pub mod outcome;

pub use controller::Controller;
pub use outcome::{Completion, OutcomeCell, RunOutcome};
