//! line-oriented state input

use std::io::BufRead;

use anyhow::{Context, Result};

use crate::conditions::Settable;

/// parse a state token: 1/0, true/false, on/off, yes/no, satisfied/unsatisfied
pub fn parse_state(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" | "satisfied" => Ok(true),
        "0" | "false" | "off" | "no" | "unsatisfied" => Ok(false),
        other => Err(format!(
            "invalid state '{}': use true/false, on/off, yes/no or 1/0",
            other
        )),
    }
}

/// apply every state line from `reader` to `target`
///
/// blank lines and lines starting with '#' are skipped. invalid lines are
/// logged and skipped. returns the number of states applied.
pub fn feed_lines<R: BufRead>(reader: R, target: &dyn Settable) -> Result<usize> {
    let mut applied = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}", index + 1))?;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_state(trimmed) {
            Ok(state) => {
                tracing::debug!(line = index + 1, state, "input state");
                target.set(state);
                applied += 1;
            }
            Err(e) => {
                tracing::warn!(line = index + 1, "{}", e);
            }
        }
    }

    Ok(applied)
}
