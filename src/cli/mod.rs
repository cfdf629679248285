mod commands;
pub mod exit_codes;
mod input;
mod output;

pub use commands::{Cli, Commands, ConditionArgs, ConfigCommands};
pub use input::{feed_lines, parse_state};

use anyhow::Result;

/// run the parsed command line, returning the process exit code
pub fn run(cli: Cli, config: crate::config::Config) -> Result<i32> {
    commands::execute(cli, config)
}
