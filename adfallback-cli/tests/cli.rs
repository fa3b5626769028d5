//! End-to-end tests for the `adfallback` binary.
//!
//! Run with: `cargo test -p adfallback-cli --test cli`

use std::io::Write;
use std::process::{Command, Output};

use serde_json::json;
use tempfile::NamedTempFile;

// ============================================================================
// Helper Functions
// ============================================================================

fn config_file(value: serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", value).unwrap();
    file
}

fn exchange_config() -> NamedTempFile {
    config_file(json!({
        "p": "partner-pub-1",
        "s": "42",
        "c": "news",
        "at": "adx",
        "fb": "1",
        "t": "cars,loans",
        "sl": "/1234/site/unit"
    }))
}

fn sense_config() -> NamedTempFile {
    config_file(json!({
        "p": "partner-pub-1",
        "s": "42",
        "c": "news",
        "fb": "1",
        "pc": "ca-pub-1",
        "sl": "9876"
    }))
}

fn adfallback(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_adfallback"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// validate / sizes
// ============================================================================

#[test]
fn test_validate_accepts_compact_config() {
    let file = exchange_config();
    let output = adfallback(&["validate", file.path().to_str().unwrap()]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Configuration OK"));
    assert!(out.contains("exchange (enabled)"));
    assert!(out.contains("/1234/site/unit"));
    assert!(out.contains("<page-origin>?campid=news&gads=42"));
}

#[test]
fn test_validate_rejects_missing_publisher() {
    let file = config_file(json!({"s": "42", "c": "news"}));
    let output = adfallback(&["validate", file.path().to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("publisherId"));
}

#[test]
fn test_validate_missing_file() {
    let output = adfallback(&["validate", "/nonexistent/adfallback.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn test_sizes_for_mobile_width() {
    let output = adfallback(&["sizes", "--width", "500"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("mobile"));
    assert!(out.contains("320x50, 320x100, 300x250"));
}

// ============================================================================
// simulate
// ============================================================================

#[test]
fn test_simulate_exchange_fallback() {
    let file = exchange_config();
    let output = adfallback(&["simulate", file.path().to_str().unwrap(), "--width", "900"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Exchange slots (1):"));
    assert!(out.contains("/1234/site/unit in #rfsbox1 [728x90, 468x60, 300x250, 336x280]"));
}

#[test]
fn test_simulate_repeated_attempts_keep_one_slot() {
    let file = exchange_config();
    let output = adfallback(&["simulate", file.path().to_str().unwrap(), "--attempts", "3"]);

    let out = stdout(&output);
    assert!(out.contains("Exchange slots (1):"));
    assert_eq!(out.matches("DefineSlot").count(), 1);
    assert_eq!(out.matches("EnableServices").count(), 1);
}

#[test]
fn test_simulate_adblock_suppresses_fallback() {
    let file = sense_config();
    let output = adfallback(&["simulate", file.path().to_str().unwrap(), "--adblock"]);

    let out = stdout(&output);
    assert!(out.contains("Sense pushes:     0"));
    assert!(out.contains("ads blocked"));
}

#[test]
fn test_simulate_rendered_primary() {
    let file = sense_config();
    let output = adfallback(&[
        "simulate",
        file.path().to_str().unwrap(),
        "--rendered-height",
        "90",
    ]);

    let out = stdout(&output);
    assert!(out.contains("primary rendered"));
    assert!(out.contains("Sense pushes:     0"));
}

#[test]
fn test_simulate_missing_primary_polls_six_times() {
    let file = sense_config();
    let output = adfallback(&["simulate", file.path().to_str().unwrap(), "--primary-missing"]);

    let out = stdout(&output);
    assert!(out.contains("Primary polls:    6"));
    assert!(out.contains("Primary requests: 0"));
    assert!(out.contains("Sense pushes:     1"));
}

#[test]
fn test_simulate_conflicting_primary_flags() {
    let file = sense_config();
    let output = adfallback(&[
        "simulate",
        file.path().to_str().unwrap(),
        "--primary-missing",
        "--primary-ready-after",
        "2",
    ]);
    assert!(!output.status.success());
}
