//! Entries accumulated by the façade and flushed as artifacts at finalization.
//!
//! Field names on the wire follow the artifact format the platform reads (`date`/`type` for log entries,
//! `replacement` for substitution data).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch
    #[serde(rename = "date")]
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub category: String,
    pub message: String,
    #[serde(default)]
    pub replacement: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailEntry {
    pub recipient: String,
    pub template: String,
    #[serde(rename = "replacement")]
    pub substitution_data: Value,
}

/// Output parameter declared for the next stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamEntry {
    pub key: String,
    pub value: Value,
}
