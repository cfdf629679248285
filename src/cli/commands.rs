use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::conditions::{Condition, ConditionError, DelayedCondition, ManualCondition};
use crate::config::{self, Settings};
use crate::triggers::{self, trigger_fn, SharedSink, Trigger, TriggerError};

use super::exit_codes;
use super::input::{self, parse_state};
use super::output::{self, OutputMode, WaitData, WaitOutcome};

/// extra time granted after end of input so the last debounce window can elapse
const SETTLE_MARGIN: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "conditional")]
#[command(about = "Drive a boolean condition from stdin, optionally debounced")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides CONDITIONAL_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// options shared by commands that build a condition
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConditionArgs {
    /// Debounce window in milliseconds, 0 disables debouncing (overrides config)
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// Initial state before any input (overrides config)
    #[arg(long, value_parser = parse_state)]
    pub initial: Option<bool>,

    /// Name passed to triggers and shown in output (overrides config)
    #[arg(short, long)]
    pub name: Option<String>,
}

impl ConditionArgs {
    /// merge command-line overrides into the configured settings
    pub fn apply(&self, settings: &Settings) -> Settings {
        let mut merged = settings.clone();
        if let Some(delay_ms) = self.delay_ms {
            merged.delay_ms = delay_ms;
        }
        if let Some(initial) = self.initial {
            merged.initial = initial;
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        merged
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read states from stdin and print every published change
    Watch {
        #[command(flatten)]
        condition: ConditionArgs,
    },

    /// Read states from stdin until the published state equals --state
    Wait {
        /// State to wait for (true/false, on/off, yes/no, 1/0)
        #[arg(long, required = true, action = clap::ArgAction::Set, value_parser = parse_state)]
        state: bool,

        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        #[command(flatten)]
        condition: ConditionArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show the configuration file location
    Path,
    /// Validate the configuration file
    Verify,
}

pub fn execute(cli: Cli, config: config::Config) -> Result<i32> {
    let mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match cli.command {
        Commands::Watch { condition } => watch(&condition.apply(&config.settings), mode),

        Commands::Wait {
            state,
            timeout_ms,
            condition,
        } => wait(
            &condition.apply(&config.settings),
            state,
            timeout_ms.map(Duration::from_millis),
            mode,
        ),

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Path => {
                let path = config::get_config_path(cli.config.as_deref())
                    .ok_or_else(|| anyhow!("Could not find home directory"))?;
                println!("{}", path.display());
                Ok(exit_codes::SUCCESS)
            }
            ConfigCommands::Verify => {
                let path = config::get_config_path(cli.config.as_deref())
                    .ok_or_else(|| anyhow!("Could not find home directory"))?;
                let errors = config::verify(&path)?;
                if errors.is_empty() {
                    if !cli.quiet {
                        println!("Configuration is valid: {}", path.display());
                    }
                    return Ok(exit_codes::SUCCESS);
                }
                for error in &errors {
                    eprintln!("{}", error);
                }
                Ok(exit_codes::CONFIG_ERROR)
            }
        },
    }
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// the condition to publish: the manual one, or a debounced view of it
fn published_condition(manual: &ManualCondition, settings: &Settings) -> Arc<dyn Condition> {
    if settings.delay_ms == 0 {
        Arc::new(manual.clone())
    } else {
        Arc::new(DelayedCondition::new(manual.clone(), settings.delay()))
    }
}

/// feed stdin into `manual` on a dedicated thread, closing it at end of input
fn spawn_feeder(manual: ManualCondition, settle: Duration) -> JoinHandle<Result<usize>> {
    thread::spawn(move || {
        let fed = input::feed_lines(io::stdin().lock(), &manual);
        match &fed {
            Ok(applied) => {
                tracing::debug!(applied, "end of input");
                thread::sleep(settle);
            }
            Err(e) => tracing::error!("{:#}", e),
        }

        // close on every path so no wait is left hanging
        manual.close()?;
        fed
    })
}

fn state_printer(mode: OutputMode) -> Arc<dyn Trigger> {
    Arc::new(trigger_fn(move |out, name, state| {
        output::write_state(out, mode, name, state).map_err(TriggerError::from)
    }))
}

fn watch(settings: &Settings, mode: OutputMode) -> Result<i32> {
    let runtime = build_runtime()?;
    let _guard = runtime.enter();

    let manual = ManualCondition::new(settings.initial);
    let condition = published_condition(&manual, settings);

    let sink: SharedSink = Arc::new(Mutex::new(io::stdout()));
    let (printer, subscription) =
        triggers::bind(&*condition, settings.name.clone(), state_printer(mode), sink);

    let feeder = spawn_feeder(manual, settings.delay() + SETTLE_MARGIN);
    let applied = feeder
        .join()
        .map_err(|_| anyhow!("input thread panicked"))??;

    subscription.cancel();
    condition.close()?;

    tracing::debug!(
        applied,
        published = printer.runs(),
        failures = printer.failures(),
        "watch finished"
    );

    if printer.failures() > 0 {
        return Ok(exit_codes::ERROR);
    }
    Ok(exit_codes::SUCCESS)
}

fn wait(
    settings: &Settings,
    target: bool,
    timeout: Option<Duration>,
    mode: OutputMode,
) -> Result<i32> {
    let runtime = build_runtime()?;
    let _guard = runtime.enter();

    let manual = ManualCondition::new(settings.initial);
    let condition = published_condition(&manual, settings);
    let handle = condition.wait_until(target);
    let start = Instant::now();

    // joined only once the condition is closed: before that the thread may
    // still be blocked on stdin
    let feeder = spawn_feeder(manual, settings.delay() + SETTLE_MARGIN);

    let result = runtime.block_on(async move {
        match timeout {
            Some(timeout) => handle.wait_timeout(timeout).await,
            None => Some(handle.await),
        }
    });

    let (outcome, code) = match result {
        Some(Ok(())) => (WaitOutcome::Reached, exit_codes::SUCCESS),
        Some(Err(ConditionError::Closed)) => (WaitOutcome::Closed, exit_codes::CONDITION_CLOSED),
        None => (WaitOutcome::Timeout, exit_codes::TIMEOUT),
    };

    condition.close()?;

    if outcome == WaitOutcome::Closed {
        // closed by the feeder: surface its input error, if any
        feeder
            .join()
            .map_err(|_| anyhow!("input thread panicked"))??;
    }

    let data = WaitData {
        name: &settings.name,
        target,
        outcome,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    output::write_wait(&mut io::stdout().lock(), mode, &data)?;

    Ok(code)
}
