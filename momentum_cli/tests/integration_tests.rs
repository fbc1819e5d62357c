//! Integration tests for the momentum binary.
//!
//! These tests verify end-to-end behavior including:
//! - Weekly plan generation and saved preferences
//! - Session playback and logging
//! - Favorites, profile and recommendations
//! - CSV rollup and statistics

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("momentum"))
}

fn cli_in(data_dir: &Path) -> Command {
    let mut cmd = cli();
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

fn session_log(data_dir: &Path) -> std::path::PathBuf {
    data_dir.join("log/sessions.jsonl")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly workout planner"));
}

#[test]
fn test_plan_full_body_week() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["plan", "--level", "beginner", "--body-part", "full-body", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Upper Body Push"))
        .stdout(predicate::str::contains("Active Recovery"))
        .stdout(predicate::str::contains("5 workout days"));

    // Preferences were stored for next time
    let user = fs::read_to_string(temp_dir.path().join("user.json")).unwrap();
    assert!(user.contains("full-body"));
}

#[test]
fn test_plan_uses_saved_preferences() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["plan", "--body-part", "chest", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Primary Focus"));

    cli_in(temp_dir.path())
        .args(["plan", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Primary Focus"))
        .stdout(predicate::str::contains("chest"));
}

#[test]
fn test_plan_is_reproducible_with_seed() {
    let temp_dir = setup_test_dir();
    let args = [
        "plan",
        "--body-part",
        "chest",
        "--body-part",
        "back",
        "--body-part",
        "legs",
        "--seed",
        "42",
        "--no-save",
    ];

    let first = cli_in(temp_dir.path()).args(args).output().unwrap();
    let second = cli_in(temp_dir.path()).args(args).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(!temp_dir.path().join("user.json").exists());
}

#[test]
fn test_plan_without_preferences_explains() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved preferences"));
}

#[test]
fn test_plan_rejects_unknown_level() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["plan", "--level", "legendary", "--body-part", "chest"])
        .assert()
        .failure();
}

#[test]
fn test_start_auto_complete_logs_session() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["start", "beginner-strength", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete and logged"))
        .stdout(predicate::str::contains("5 exercises, 14 sets"));

    let log = fs::read_to_string(session_log(temp_dir.path())).unwrap();
    assert_eq!(log.lines().count(), 1);

    let session: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
    assert_eq!(session["program_id"], "beginner-strength");
    assert_eq!(session["user_id"], "local-user");
    assert!(session["completed_at"].is_string());
    assert_eq!(session["exercises"].as_array().unwrap().len(), 5);
}

#[test]
fn test_session_logging_is_traced() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .env("RUST_LOG", "momentum=info")
        .args(["start", "beginner-strength", "--auto-complete"])
        .assert()
        .success()
        .stderr(predicate::str::contains("logged to"));

    cli_in(temp_dir.path())
        .env("RUST_LOG", "momentum=info")
        .arg("rollup")
        .assert()
        .success()
        .stderr(predicate::str::contains("Rolled 1 sessions"));

    // Default level stays quiet
    cli_in(temp_dir.path())
        .env_remove("RUST_LOG")
        .args(["start", "beginner-strength", "--auto-complete"])
        .assert()
        .success()
        .stderr(predicate::str::contains("logged to").not());
}

#[test]
fn test_start_auto_skip_records_no_sets() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["start", "beginner-strength", "--auto-skip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 exercises, 0 sets"));

    let log = fs::read_to_string(session_log(temp_dir.path())).unwrap();
    let session: serde_json::Value = serde_json::from_str(log.trim()).unwrap();
    assert!(session["exercises"].as_array().unwrap().is_empty());
}

#[test]
fn test_start_with_missing_first_exercise_fails() {
    let temp_dir = setup_test_dir();

    // cardio-blast opens with an exercise the catalog does not ship
    cli_in(temp_dir.path())
        .args(["start", "cardio-blast", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Exercise not found: 13"));

    assert!(!session_log(temp_dir.path()).exists());
}

#[test]
fn test_start_abandons_at_missing_exercise() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["start", "core-crusher", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("session was abandoned"));

    assert!(!session_log(temp_dir.path()).exists());
}

#[test]
fn test_start_unknown_program() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["start", "no-such-program", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No program with id"));
}

#[test]
fn test_quit_from_prompt_records_nothing() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["start", "beginner-strength"])
        .write_stdin("\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout cancelled"));

    assert!(!session_log(temp_dir.path()).exists());
}

#[test]
fn test_exercise_library_filters() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["exercises", "--category", "cardio"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Burpees"))
        .stdout(predicate::str::contains("Push-ups").not());

    cli_in(temp_dir.path())
        .args(["exercises", "--equipment", "dumbbells"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dumbbell Rows"))
        .stdout(predicate::str::contains("Squats").not());

    cli_in(temp_dir.path())
        .args(["exercises", "--search", "zzz"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises match"));
}

#[test]
fn test_favorites_roundtrip() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["favorite", "add", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Push-ups"));

    cli_in(temp_dir.path())
        .args(["favorite", "add", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already a favorite"));

    cli_in(temp_dir.path())
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Push-ups"));

    cli_in(temp_dir.path())
        .args(["favorite", "add", "yoga-1"])
        .assert()
        .failure();

    cli_in(temp_dir.path())
        .args(["favorite", "remove", "1"])
        .assert()
        .success();

    cli_in(temp_dir.path())
        .args(["favorite", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No favorite exercises"));
}

#[test]
fn test_profile_validation_and_recommendations() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["profile", "set", "--name", "Sam", "--age", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("age 12"));

    cli_in(temp_dir.path())
        .args([
            "profile", "set", "--name", "Sam", "--age", "30", "--level", "intermediate",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved for Sam"));

    cli_in(temp_dir.path())
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("intermediate"));

    cli_in(temp_dir.path())
        .args(["programs", "--recommended"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4-week-full-body"))
        .stdout(predicate::str::contains("beginner-strength").not());
}

#[test]
fn test_programs_marks_unavailable_exercises() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .args(["programs", "--difficulty", "intermediate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cardio-blast"))
        .stdout(predicate::str::contains("unavailable"))
        .stdout(predicate::str::contains("intro-yoga").not());
}

#[test]
fn test_rollup_and_stats() {
    let temp_dir = setup_test_dir();

    for _ in 0..3 {
        cli_in(temp_dir.path())
            .args(["start", "beginner-strength", "--auto-complete"])
            .assert()
            .success();
    }

    cli_in(temp_dir.path())
        .args(["rollup", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 sessions"));

    assert!(temp_dir.path().join("sessions.csv").exists());
    assert!(fs::read_to_string(session_log(temp_dir.path())).unwrap().is_empty());
    assert!(!temp_dir.path().join("log/sessions.jsonl.processed").exists());

    cli_in(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total workouts:   3"))
        .stdout(predicate::str::contains("Current streak:   1 days"));
}

#[test]
fn test_rollup_without_log() {
    let temp_dir = setup_test_dir();

    cli_in(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_storage_disabled_by_config() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[storage]\nenabled = false\n").unwrap();

    cli_in(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["start", "beginner-strength", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("storage disabled"));

    assert!(!session_log(temp_dir.path()).exists());
}
