//! Built-in units available from the CLI.
//!
//! These exercise the harness end to end without an external unit: copying input to output, fanning out to two
//! outputs, drawing ids, and never completing.

use std::io::{Read, Write};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{HarnessError, HarnessResult};
use crate::payload::Payload;
use crate::run::Completion;
use crate::services::Services;
use crate::unit::{Unit, UnitRegistry};

/// Registry with every built-in unit.
pub fn builtin_registry() -> UnitRegistry {
    UnitRegistry::new()
        .with("echo", Echo)
        .with("idle", Idle)
        .with("sequence", Sequence)
        .with("splitter", Splitter)
}

fn read_input(services: &Services) -> std::io::Result<Vec<u8>> {
    let mut input = services.open_input_stream();
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Copies the input file to `output/echo_output` and reports the byte count.
pub struct Echo;

#[async_trait]
impl Unit for Echo {
    async fn flight(&self, services: Services, _payload: Payload, done: Completion) {
        let copied = read_input(&services).and_then(|bytes| {
            let mut out = services
                .write_stream_manager()
                .get_write_stream("echo_output", "output")
                .map_err(std::io::Error::other)?;
            out.write_all(&bytes)?;
            out.close()?;
            Ok(bytes.len())
        });

        match copied {
            Ok(bytes) => {
                services.log(format!("copied {bytes} bytes"), "info");
                services.add_param("bytes", bytes);
                done.succeed(json!({ "bytes": bytes }));
            }
            Err(err) => {
                done.fail(err);
            }
        }
    }
}

/// Draws two ids and completes with them.
pub struct Sequence;

#[async_trait]
impl Unit for Sequence {
    async fn flight(&self, services: Services, _payload: Payload, done: Completion) {
        let first = services.next_id();
        let second = services.next_id();
        services.log(format!("drew ids {first} and {second}"), "info");
        done.succeed(json!([first, second]));
    }
}

/// Splits input lines into two output files by parity.
pub struct Splitter;

fn split_lines(services: &Services, payload: &Payload) -> HarnessResult<Value> {
    let bytes = read_input(services).map_err(|e| HarnessError::io("reading input", e))?;
    let text = String::from_utf8_lossy(&bytes);
    let manager = services.write_stream_manager();
    let mut even = manager.get_write_stream("even_lines", "output")?;
    let mut odd = manager.get_write_stream("odd_lines", "output")?;

    let mut lines = 0;
    for (index, line) in text.lines().enumerate() {
        let target = if index % 2 == 0 { &mut even } else { &mut odd };
        writeln!(target, "{line}").map_err(|e| HarnessError::io("writing split output", e))?;
        lines += 1;
    }

    services.mail(payload.user_data.user_id.clone(), "split_complete", json!({ "lines": lines }));
    Ok(json!({ "lines": lines }))
}

#[async_trait]
impl Unit for Splitter {
    async fn flight(&self, services: Services, payload: Payload, done: Completion) {
        done.finish(split_lines(&services, &payload));
    }
}

/// Never calls its completion handle; the run ends by timeout.
pub struct Idle;

#[async_trait]
impl Unit for Idle {
    async fn flight(&self, services: Services, _payload: Payload, _done: Completion) {
        services.log("idling until the budget runs out", "info");
    }
}
