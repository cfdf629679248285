mod schema;

pub use schema::{Config, Settings, DEFAULT_DELAY_MS, DEFAULT_NAME, MAX_DELAY_MS};

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "CONDITIONAL_CONFIG";

/// resolve the config file location
///
/// priority: explicit path > CONDITIONAL_CONFIG > ~/.conditional/config.json
pub fn get_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    dirs::home_dir().map(|home| home.join(".conditional").join("config.json"))
}

/// load the config, falling back to defaults when no file exists
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let Some(path) = get_config_path(explicit) else {
        return Ok(Config::default());
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(anyhow!("config file not found: {}", path.display()));
        }
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(content)?;
    Ok(config)
}

/// Verify configuration file and return a list of errors
pub fn verify(path: &Path) -> Result<Vec<String>> {
    let mut errors = Vec::new();

    if !path.exists() {
        return Err(anyhow!("config file not found: {}", path.display()));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config = match parse(&content) {
        Ok(c) => c,
        Err(e) => {
            return Err(anyhow!("invalid JSON: {}", e));
        }
    };

    let settings = &config.settings;

    if settings.delay_ms > MAX_DELAY_MS {
        errors.push(format!(
            "settings.delay_ms: {} exceeds the maximum of {}",
            settings.delay_ms, MAX_DELAY_MS
        ));
    }

    if settings.name.trim().is_empty() {
        errors.push("settings.name: must not be empty".to_string());
    }

    if let Some(filter) = &settings.log_filter {
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(filter) {
            errors.push(format!("settings.log_filter: invalid filter '{}': {}", filter, e));
        }
    }

    Ok(errors)
}
