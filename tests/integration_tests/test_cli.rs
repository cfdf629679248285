// integration tests for the conditional binary

use crate::common::*;

fn test_config(delay_ms: u64) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        serde_json::json!({
            "settings": {
                "delay_ms": delay_ms,
                "name": "door"
            }
        }),
    );
    (dir, path)
}

#[test]
fn test_watch_prints_every_change() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--json", "watch"], "on\noff\n", &config);
    assert!(output.status.success(), "{:?}", output);

    let lines = json_lines(&output);
    let states: Vec<bool> = lines
        .iter()
        .map(|l| l["params"]["satisfied"].as_bool().unwrap())
        .collect();
    assert_eq!(states, vec![false, true, false]);

    for line in &lines {
        assert_eq!(line["method"], "state");
        assert_eq!(line["params"]["name"], "door");
    }
}

#[test]
fn test_watch_debounces_flicker() {
    let (_dir, config) = test_config(200);

    let output = run_conditional(&["--json", "watch"], "on\noff\n", &config);
    assert!(output.status.success(), "{:?}", output);

    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["params"]["satisfied"], false);
}

#[test]
fn test_watch_publishes_lasting_state() {
    let (_dir, config) = test_config(50);

    let output = run_conditional(
        &["--json", "watch", "--name", "lamp", "--initial", "on"],
        "off\n",
        &config,
    );
    assert!(output.status.success(), "{:?}", output);

    let lines = json_lines(&output);
    let states: Vec<bool> = lines
        .iter()
        .map(|l| l["params"]["satisfied"].as_bool().unwrap())
        .collect();
    assert_eq!(states, vec![true, false]);
    assert_eq!(lines[0]["params"]["name"], "lamp");
}

#[test]
fn test_watch_text_output() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--no-json", "watch"], "yes\n", &config);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("door: unsatisfied"));
    assert!(lines[1].ends_with("door: satisfied"));
}

#[test]
fn test_wait_reached() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--json", "wait", "--state", "true"], "off\non\n", &config);
    assert_eq!(output.status.code(), Some(0), "{:?}", output);

    let lines = json_lines(&output);
    assert_eq!(lines[0]["result"]["outcome"], "reached");
    assert_eq!(lines[0]["result"]["target"], true);
}

#[test]
fn test_wait_already_satisfied() {
    let (_dir, config) = test_config(100);

    let output = run_conditional(
        &["--json", "wait", "--state", "off", "--timeout-ms", "5000"],
        "",
        &config,
    );
    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    assert_eq!(json_lines(&output)[0]["result"]["outcome"], "reached");
}

#[test]
fn test_wait_closed_by_end_of_input() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--json", "wait", "--state", "on"], "off\n", &config);
    assert_eq!(output.status.code(), Some(2), "{:?}", output);
    assert_eq!(json_lines(&output)[0]["result"]["outcome"], "closed");
}

#[test]
fn test_wait_fails_on_unreadable_input() {
    let (_dir, config) = test_config(0);

    let output = run_conditional_bytes(&["wait", "--state", "on"], b"off\n\xff\n", &config);
    // exits instead of waiting forever, and reports the input error
    assert_eq!(output.status.code(), Some(1), "{:?}", output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read input line 2"), "{}", stderr);
}

#[test]
fn test_invalid_arguments_exit_code() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["wait", "--state", "maybe"], "", &config);
    assert_eq!(output.status.code(), Some(4), "{:?}", output);

    let output = run_conditional(&["frobnicate"], "", &config);
    assert_eq!(output.status.code(), Some(4), "{:?}", output);
}

#[test]
fn test_help_and_version_exit_zero() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--help"], "", &config);
    assert_eq!(output.status.code(), Some(0), "{:?}", output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));

    let output = run_conditional(&["--version"], "", &config);
    assert_eq!(output.status.code(), Some(0), "{:?}", output);
}

#[test]
fn test_wait_quiet_prints_nothing() {
    let (_dir, config) = test_config(0);

    let output = run_conditional(&["--quiet", "wait", "--state", "1"], "1\n", &config);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_config_verify_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), serde_json::json!({ "settings": { "name": "" } }));

    let output = run_conditional(&["config", "verify"], "", &config);
    assert_eq!(output.status.code(), Some(5));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("settings.name"), "{}", stderr);
}

#[test]
fn test_config_show() {
    let (_dir, config) = test_config(123);

    let output = run_conditional(&["config", "show"], "", &config);
    assert!(output.status.success());

    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["settings"]["delay_ms"], 123);
    assert_eq!(shown["settings"]["name"], "door");
}

#[test]
fn test_missing_explicit_config_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    let output = run_conditional(&["watch"], "", &missing);
    assert_eq!(output.status.code(), Some(5));
}
