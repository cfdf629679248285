use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_NAME: &str = "condition";

/// longest debounce window accepted by `verify`
pub const MAX_DELAY_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// debounce window in milliseconds (0 disables debouncing)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// state of the condition before any input is read
    #[serde(default)]
    pub initial: bool,
    /// name passed to triggers
    #[serde(default = "default_name")]
    pub name: String,
    /// tracing filter used when RUST_LOG is not set (e.g. "conditional=debug")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY_MS,
            initial: false,
            name: DEFAULT_NAME.to_string(),
            log_filter: None,
        }
    }
}

impl Settings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
