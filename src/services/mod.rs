//! Mock Service Façade
//!
//! The capability surface a unit under test is allowed to use. Nothing here reaches a real platform: mail is
//! recorded instead of sent, ids come from a run-local counter, and everything a unit records is flushed to the
//! output directory only when the run finalizes.
//!
//! ## Modules
//!
//! - `entries` - log, mail and parameter entries (artifact wire format)
//! - `streams` - tracked read/write streams and the write stream manager
//!
//! ## Notes
//!
//! - A `Services` value is bound to exactly one run. Clones share that run's state.
//! - Once the run's outcome is decided, `log`/`mail`/`add_param` drop their input (counted in the report).

pub mod entries;
pub mod streams;

use std::sync::Arc;
use std::time::Duration;

use harness_core::defaults;
use serde_json::{Map, Value};

use crate::payload::FileInfoMap;
use crate::run::context::RunContext;

use entries::{LogEntry, MailEntry, ParamEntry};
use streams::{ReadStream, WriteStreamManager};

/// Façade handed to a unit's entry point.
#[derive(Clone)]
pub struct Services {
    ctx: Arc<RunContext>,
    write_streams: WriteStreamManager,
}

impl Services {
    pub(crate) fn new(ctx: Arc<RunContext>) -> Self {
        Self {
            write_streams: WriteStreamManager::new(ctx.clone()),
            ctx,
        }
    }

    /// Record a log message under `category` (e.g. `"info"`, `"error"`).
    pub fn log(&self, message: impl Into<String>, category: impl Into<String>) {
        self.log_with(message, category, Map::new());
    }

    /// Record a log message with substitution data.
    pub fn log_with(&self, message: impl Into<String>, category: impl Into<String>, replacement: Map<String, Value>) {
        let entry = LogEntry {
            timestamp: chrono::Utc::now().timestamp_millis(),
            category: category.into(),
            message: message.into(),
            replacement,
        };
        self.ctx.append("log", |acc| acc.logs.push(entry));
    }

    /// Record a mail request. Nothing is ever delivered.
    pub fn mail(&self, recipient: impl Into<String>, template: impl Into<String>, substitution_data: Value) {
        let entry = MailEntry {
            recipient: recipient.into(),
            template: template.into(),
            substitution_data,
        };
        self.ctx.append("mail", |acc| acc.mail.push(entry));
    }

    /// Next value of the run's id sequence: 1, 2, 3, ...
    pub fn next_id(&self) -> u64 {
        self.ctx.next_id()
    }

    /// Declare an output parameter for the next stage.
    pub fn add_param(&self, key: impl Into<String>, value: impl Into<Value>) {
        let entry = ParamEntry {
            key: key.into(),
            value: value.into(),
        };
        self.ctx.append("param", |acc| acc.params.push(entry));
    }

    /// Budget left to the unit. Observational only; never negative.
    pub fn remaining_time(&self) -> Duration {
        self.ctx.clock.remaining()
    }

    /// The run's input stream. Every call returns the same handle.
    pub fn open_input_stream(&self) -> ReadStream {
        self.ctx.input.clone()
    }

    pub fn write_stream_manager(&self) -> &WriteStreamManager {
        &self.write_streams
    }

    pub fn file_type(&self, file_name: &str) -> i64 {
        self.ctx.file_info.file_type(file_name)
    }

    pub fn file_tags(&self, file_name: &str) -> Vec<String> {
        self.ctx.file_info.file_tags(file_name)
    }

    pub fn file_info(&self) -> &FileInfoMap {
        &self.ctx.file_info
    }

    /// Log that an input value named `field` failed validation.
    pub fn validation_error(&self, field: &str) {
        self.log(format!("Input value for '{field}' is not correct"), "error");
    }

    /// Balance locks always succeed locally.
    pub fn set_balance_lock(&self, _params: &Value) -> bool {
        true
    }

    /// Platform system parameter, e.g. `cost_per_email`.
    pub fn system_param(&self, name: &str) -> Option<i64> {
        defaults::system_param(name)
    }

    /// How many output-role streams the unit has requested so far.
    pub fn output_streams_requested(&self) -> usize {
        self.ctx.output_streams_requested()
    }
}
