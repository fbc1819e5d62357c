//! Concurrency tests for the momentum binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the session log simultaneously (file locking)
//! - Update the user document without corrupting it
//! - Roll up the log while new sessions arrive

use assert_cmd::Command;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("momentum"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn run_session(data_dir: &Path) {
    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["start", "beginner-strength", "--auto-complete"])
        .timeout(Duration::from_secs(10))
        .assert()
        .success();
}

#[test]
fn test_no_log_corruption_under_load() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(i * 5));
                run_session(&data_dir);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let log_path = data_dir.join("log/sessions.jsonl");
    let content = std::fs::read_to_string(&log_path).expect("Failed to read session log");

    let mut valid_count = 0;
    for line in content.lines().filter(|l| !l.is_empty()) {
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(line);
        assert!(parsed.is_ok(), "Log contains invalid JSON line: {}", line);
        valid_count += 1;
    }

    assert_eq!(valid_count, 10, "Expected 10 valid sessions in the log");
}

#[test]
fn test_rollup_while_writing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    for _ in 0..3 {
        run_session(&data_dir);
    }

    let data_dir_rollup = data_dir.clone();
    let rollup_handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        cli()
            .arg("--data-dir")
            .arg(&data_dir_rollup)
            .arg("rollup")
            .assert()
            .success();
    });

    for _ in 0..2 {
        run_session(&data_dir);
        thread::sleep(Duration::from_millis(5));
    }

    rollup_handle.join().expect("Rollup thread panicked");

    let csv = std::fs::read_to_string(data_dir.join("sessions.csv")).expect("Failed to read CSV");
    let archived = csv.lines().skip(1).filter(|l| !l.is_empty()).count();

    // Sessions written during or after the rollup are still in the live log
    let log = std::fs::read_to_string(data_dir.join("log/sessions.jsonl"))
        .expect("Failed to read session log");
    let live = log.lines().filter(|l| !l.is_empty()).count();
    assert!(log.lines().all(|l| serde_json::from_str::<serde_json::Value>(l).is_ok()));

    assert_eq!(archived + live, 5, "every session is either archived or still logged");
}

#[test]
fn test_concurrent_favorite_updates_keep_valid_json() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = ["1", "2", "3", "4"]
        .into_iter()
        .map(|id| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .args(["favorite", "add", id])
                    .timeout(Duration::from_secs(10))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Last writer wins, but the document is never torn
    let content =
        std::fs::read_to_string(data_dir.join("user.json")).expect("Failed to read user file");
    let parsed: serde_json::Value =
        serde_json::from_str(&content).expect("User file contains invalid JSON");
    assert!(!parsed["favorite_exercises"].as_array().unwrap().is_empty());
}
