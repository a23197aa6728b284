//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. HOME points
//! at a temporary directory so config writes stay out of the real profile.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "stillpoint-cli", "--"])
        .args(args)
        .env("HOME", home)
        .env_remove("STILLPOINT_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn write_history(dir: &Path, json: &str) -> String {
    let path = dir.join("history.json");
    std::fs::write(&path, json).unwrap();
    path.to_string_lossy().to_string()
}

const EVENING_HISTORY: &str = r#"[
    {"activityId": "hip-opener", "completedAt": "2026-04-01T20:00:00+00:00", "durationMinutes": 25},
    {"activityId": "hip-opener", "completedAt": "2026-04-02T20:00:00+00:00", "durationMinutes": 25},
    {"activityId": "hip-opener", "completedAt": "2026-04-03T20:00:00+00:00", "durationMinutes": 25,
     "preMood": 2, "moodImprovement": 1.5}
]"#;

#[test]
fn test_recommend_empty_history_json() {
    let home = tempfile::tempdir().unwrap();
    let history = write_history(home.path(), "[]");

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &["recommend", "--history", &history, "--at", "2026-04-05T07:30:00+00:00", "--json"],
    );
    assert_eq!(code, 0, "recommend failed: {stderr}");

    let rec: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rec["activityId"], "morning-flow");
    assert_eq!(rec["category"], "time");
    assert_eq!(rec["confidence"], 0.5);
}

#[test]
fn test_top_respects_limit_and_uniqueness() {
    let home = tempfile::tempdir().unwrap();
    let history = write_history(home.path(), EVENING_HISTORY);

    let (stdout, stderr, code) = run_cli(
        home.path(),
        &[
            "top", "--history", &history, "--limit", "4",
            "--at", "2026-04-05T19:00:00+00:00", "--json",
        ],
    );
    assert_eq!(code, 0, "top failed: {stderr}");

    let recs: Vec<serde_json::Value> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(recs.len(), 4);
    assert_eq!(recs[0]["activityId"], "hip-opener");
    assert_eq!(recs[0]["category"], "history");

    let mut ids: Vec<_> = recs.iter().map(|r| r["activityId"].to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_top_zero_limit_fails() {
    let home = tempfile::tempdir().unwrap();
    let history = write_history(home.path(), "[]");

    let (_, stderr, code) = run_cli(home.path(), &["top", "--history", &history, "--limit", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("limit"), "unexpected stderr: {stderr}");
}

#[test]
fn test_patterns_text_output() {
    let home = tempfile::tempdir().unwrap();
    let history = write_history(home.path(), EVENING_HISTORY);

    let (stdout, _, code) = run_cli(home.path(), &["patterns", "--history", &history]);
    assert_eq!(code, 0);
    assert!(stdout.contains("evening"));
    assert!(stdout.contains("hip-opener (3x)"));
}

#[test]
fn test_skipped_records_reported() {
    let home = tempfile::tempdir().unwrap();
    let history = write_history(home.path(), r#"[{"completedAt": "2026-04-01T20:00:00Z"}]"#);

    let (stdout, stderr, code) =
        run_cli(home.path(), &["patterns", "--history", &history, "--json"]);
    assert_eq!(code, 0);
    assert!(stderr.contains("skipped 1"));
    let profile: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(profile["totalEntries"], 0);
}

#[test]
fn test_catalog_list() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["catalog", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("morning-flow"));
    assert!(stdout.contains("default night"));
}

#[test]
fn test_config_set_and_get() {
    let home = tempfile::tempdir().unwrap();

    let (_, _, code) = run_cli(home.path(), &["config", "set", "engine.default_limit", "3"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "engine.default_limit"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "engine.mood_confidence", "4"]);
    assert_ne!(code, 0);
}
