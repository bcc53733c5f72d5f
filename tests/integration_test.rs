//! Argument and config validation through the built binary; none of these
//! paths touch the bus so they run without a hub attached.
extern crate ykushctl;

mod common;

use std::io::Write;

/// No action argument prints usage rather than silently doing nothing
#[test]
fn test_no_args_prints_usage() {
    let te = common::TestEnv::new();

    let output = te.run(&[]);
    assert!(!output.status.success());

    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(text.contains("Usage"), "expected usage text, got: {}", text);
}

/// Long help carries the port power options
#[test]
fn test_help() {
    let te = common::TestEnv::new();

    let output = te.run(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--up"));
    assert!(stdout.contains("--down"));
    assert!(stdout.contains("--list"));
    assert!(stdout.contains("--mirror-byte"));
}

/// Out of range and malformed ports are rejected before any device I/O
#[test]
fn test_rejects_invalid_port() {
    let te = common::TestEnv::new();

    te.assert_failure_with_stderr(&["-u", "9"], "InvalidArg");
    te.assert_failure_with_stderr(&["-d", "0"], "InvalidArg");
    te.assert_failure_with_stderr(&["-u", "first"], "InvalidArg");
}

/// Up and down in one invocation is contradictory
#[test]
fn test_rejects_conflicting_directions() {
    let te = common::TestEnv::new();

    let output = te.run(&["-u", "1", "-d", "2"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be used with"));
}

/// A hub ordinal alone is not an action
#[test]
fn test_rejects_hub_without_action() {
    let te = common::TestEnv::new();

    te.assert_failure_with_stderr(&["-h", "2"], "InvalidArg");
}

/// Missing explicit config file is a hard error, not a silent default
#[test]
fn test_missing_config_file() {
    let te = common::TestEnv::new();

    te.assert_failure_with_stderr(
        &["--config", "/nonexistent/ykushctl.json", "-u", "1"],
        "Io Error",
    );
}

/// Unknown config keys are rejected rather than ignored
#[test]
fn test_rejects_unknown_config_key() {
    let te = common::TestEnv::new();

    let path = std::env::temp_dir().join("ykushctl_bad_config.json");
    let mut f = std::fs::File::create(&path).expect("create temp config");
    f.write_all(br#"{"port-count": 9}"#).expect("write temp config");
    drop(f);

    te.assert_failure_with_stderr(
        &["--config", path.to_str().expect("temp path utf-8"), "-u", "1"],
        "Config Error",
    );

    std::fs::remove_file(&path).ok();
}

/// A valid config file still leaves CLI validation in force
#[test]
fn test_valid_config_with_invalid_port() {
    let te = common::TestEnv::new();

    let path = std::env::temp_dir().join("ykushctl_mirror_config.json");
    let mut f = std::fs::File::create(&path).expect("create temp config");
    f.write_all(br#"{"mirror-byte": true, "default-hub": 2}"#)
        .expect("write temp config");
    drop(f);

    te.assert_failure_with_stderr(
        &["--config", path.to_str().expect("temp path utf-8"), "-u", "9"],
        "InvalidArg",
    );

    std::fs::remove_file(&path).ok();
}
