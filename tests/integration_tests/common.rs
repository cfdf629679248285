// shared utilities for integration tests

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};

use conditional::conditions::{Condition, ConditionObserver, Subscription};

/// path of the compiled conditional binary
pub fn conditional_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_conditional"))
}

/// write a config file into `dir` and return its path
pub fn write_config(dir: &Path, config: serde_json::Value) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap())
        .expect("Failed to write test config");
    path
}

/// run conditional with `args`, feeding `stdin` and closing it afterwards
pub fn run_conditional(args: &[&str], stdin: &str, config: &Path) -> Output {
    run_conditional_bytes(args, stdin.as_bytes(), config)
}

/// like `run_conditional`, with raw (possibly non UTF-8) stdin
pub fn run_conditional_bytes(args: &[&str], stdin: &[u8], config: &Path) -> Output {
    let mut child = Command::new(conditional_binary_path())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run conditional");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        // the child may exit before reading everything (e.g. wait reached its state)
        let _ = pipe.write_all(stdin);
    }

    child.wait_with_output().expect("Failed to wait for conditional")
}

/// parse every stdout line as JSON
pub fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
        .collect()
}

/// register an observer that records every state it receives
pub fn record(condition: &dyn Condition) -> (Arc<Mutex<Vec<bool>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer: Arc<dyn ConditionObserver> =
        Arc::new(move |state: bool| sink.lock().unwrap().push(state));
    let subscription = condition.register(observer);
    (seen, subscription)
}
