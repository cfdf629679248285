//! output formatting utilities for scriptable CLI output
//!
//! uses JSON-RPC 2.0 format for machine-readable output:
//! - state changes: {"jsonrpc": "2.0", "method": "state", "params": {...}}
//! - wait result: {"jsonrpc": "2.0", "result": {...}, "id": null}

use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON-RPC version constant
const JSONRPC_VERSION: &str = "2.0";

/// output mode determines how results are formatted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// human-readable text output
    Text,
    /// machine-readable JSON-RPC 2.0 output
    Json,
    /// no output on success (errors still go to stderr)
    Quiet,
}

impl OutputMode {
    /// determine output mode from CLI flags and environment
    ///
    /// priority: quiet > json > no_json > auto-detect
    pub fn from_flags(json: bool, no_json: bool, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        if json {
            return Self::Json;
        }
        if no_json {
            return Self::Text;
        }
        // auto-detect: JSON when stdout is not a TTY (piped)
        if !io::stdout().is_terminal() {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// JSON-RPC 2.0 notification
#[derive(Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

/// JSON-RPC 2.0 success response
#[derive(Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub result: T,
    /// null for CLI responses (no request id)
    pub id: Option<String>,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result,
            id: None,
        }
    }
}

/// a published state change
#[derive(Debug, Serialize)]
pub struct StateData<'a> {
    pub ts: DateTime<Utc>,
    pub name: &'a str,
    pub satisfied: bool,
}

/// how a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    Reached,
    Closed,
    Timeout,
}

impl WaitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitOutcome::Reached => "reached",
            WaitOutcome::Closed => "closed",
            WaitOutcome::Timeout => "timeout",
        }
    }
}

/// result of the wait command
#[derive(Debug, Serialize)]
pub struct WaitData<'a> {
    pub name: &'a str,
    pub target: bool,
    pub outcome: WaitOutcome,
    pub elapsed_ms: u64,
}

fn state_word(satisfied: bool) -> &'static str {
    if satisfied {
        "satisfied"
    } else {
        "unsatisfied"
    }
}

/// write one published state in the given mode
pub fn write_state(
    out: &mut dyn Write,
    mode: OutputMode,
    name: &str,
    satisfied: bool,
) -> io::Result<()> {
    let data = StateData {
        ts: Utc::now(),
        name,
        satisfied,
    };

    match mode {
        OutputMode::Quiet => Ok(()),
        OutputMode::Json => {
            let notification = JsonRpcNotification {
                jsonrpc: JSONRPC_VERSION,
                method: "state",
                params: data,
            };
            serde_json::to_writer(&mut *out, &notification)?;
            writeln!(out)
        }
        OutputMode::Text => writeln!(
            out,
            "{}  {}: {}",
            data.ts.to_rfc3339(),
            data.name,
            state_word(data.satisfied)
        ),
    }
}

/// write the wait command result in the given mode
pub fn write_wait(out: &mut dyn Write, mode: OutputMode, data: &WaitData<'_>) -> io::Result<()> {
    match mode {
        OutputMode::Quiet => Ok(()),
        OutputMode::Json => {
            serde_json::to_writer(&mut *out, &JsonRpcResponse::new(data))?;
            writeln!(out)
        }
        OutputMode::Text => writeln!(
            out,
            "{}: {} ({}) after {}ms",
            data.name,
            data.outcome.as_str(),
            state_word(data.target),
            data.elapsed_ms
        ),
    }
}
