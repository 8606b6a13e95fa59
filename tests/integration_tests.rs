//! Integration tests for the jdelta CLI.
//!
//! These tests run the compiled binary end to end: argument handling,
//! parsing, diffing and output formatting.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn jdelta() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("jdelta"))
}

fn stdout_json(args: &[&str]) -> serde_json::Value {
    let output = jdelta().args(args).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_identical_documents_print_empty_object() {
    jdelta()
        .arg(r#"{"a": [1, 2]}"#)
        .arg(r#"{"a":[1,2]}"#)
        .assert()
        .success()
        .code(0)
        .stdout("{}\n");
}

#[test]
fn test_added_key() {
    assert_eq!(stdout_json(&["{}", r#"{"x": 1}"#]), serde_json::json!({"x": [1]}));
}

#[test]
fn test_scalar_modified() {
    assert_eq!(stdout_json(&[r#""a""#, "1"]), serde_json::json!(["a", 1]));
}

#[test]
fn test_array_move() {
    assert_eq!(
        stdout_json(&["[1,2,3]", "[1,3,2]"]),
        serde_json::json!({"_t": "a", "_2": ["", 1, 3]})
    );
}

#[test]
fn test_negative_number_documents() {
    assert_eq!(stdout_json(&["-1", "2"]), serde_json::json!([-1, 2]));
    assert_eq!(stdout_json(&["-f", "json", "3", "-0.5"]), serde_json::json!([3, -0.5]));
}

#[test]
fn test_compact_format() {
    jdelta()
        .args(["--format", "compact", r#"{"a": 1}"#, r#"{"a": 2}"#])
        .assert()
        .success()
        .stdout("{\"a\":[1,2]}\n");
}

#[test]
fn test_plain_format() {
    jdelta()
        .args(["-f", "plain", r#"{"age": 30}"#, r#"{"age": 31}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("• age: 30 → 31"))
        .stdout(predicate::str::contains("Summary: 1 modified"));
}

#[test]
fn test_quiet_flag_hides_summary() {
    jdelta()
        .args(["-f", "plain", "--quiet", r#"{"age": 30}"#, r#"{"age": 31}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary").not());
}

#[test]
fn test_malformed_json_fails_without_stdout() {
    jdelta()
        .arg(r#"{"a": 1"#)
        .arg("{}")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("left document"));
}

#[test]
fn test_wrong_argument_count_fails() {
    jdelta()
        .arg("{}")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Expected exactly 2 JSON arguments, got 1"));

    jdelta()
        .args(["1", "2", "3"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("got 3"));
}

#[test]
fn test_exit_code_flag() {
    jdelta().args(["--exit-code", "1", "1"]).assert().code(0);
    jdelta().args(["--exit-code", "1", "2"]).assert().code(1);
}

#[test]
fn test_no_moves_flag() {
    assert_eq!(
        stdout_json(&["--no-moves", "[1,2,3]", "[1,3,2]"]),
        serde_json::json!({"_t": "a", "1": [3], "_2": [3, 0, 0]})
    );
}

#[test]
fn test_object_hash_flag() {
    assert_eq!(
        stdout_json(&[
            "--object-hash",
            "id",
            r#"[{"id": 1}, {"id": 2, "v": 0}]"#,
            r#"[{"id": 2, "v": 1}, {"id": 1}]"#,
        ]),
        serde_json::json!({"_t": "a", "_1": ["", 0, 3], "0": {"v": [0, 1]}})
    );
}

#[test]
fn test_ignore_pattern() {
    assert_eq!(
        stdout_json(&[
            "--ignore",
            "meta.**",
            r#"{"meta": {"t": 1}, "v": 1}"#,
            r#"{"meta": {"t": 2}, "v": 2}"#,
        ]),
        serde_json::json!({"v": [1, 2]})
    );
}

#[test]
fn test_files_mode() {
    assert_eq!(
        stdout_json(&[
            "--files",
            "tests/fixtures/user_old.json",
            "tests/fixtures/user_new.json",
        ]),
        serde_json::json!({
            "age": [30, 31],
            "email": ["alice@example.com"],
            "meta": {"updated": ["2024-01-01", "2024-02-01"]},
            "roles": {"_t": "a", "_2": ["", 1, 3]},
        })
    );
}

#[test]
fn test_files_mode_mixed_formats() {
    jdelta()
        .args([
            "--files",
            "tests/fixtures/user_old.yaml",
            "tests/fixtures/user_old.json",
        ])
        .assert()
        .success()
        .stdout("{}\n");
}

#[test]
fn test_files_mode_invalid_file() {
    jdelta()
        .args([
            "--files",
            "tests/fixtures/invalid.json",
            "tests/fixtures/user_old.json",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid JSON"));
}

#[test]
fn test_files_mode_missing_file() {
    jdelta()
        .args(["--files", "tests/fixtures/nonexistent.json", "tests/fixtures/user_old.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_files_mode_toml_tempfile() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "name = \"Alice\"\nage = 30").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    assert_eq!(
        stdout_json(&["--files", &path, "tests/fixtures/user_old.json"]),
        serde_json::json!({
            "meta": [{"updated": "2024-01-01"}],
            "roles": [["admin", "dev", "ops"]],
        })
    );
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    jdelta()
        .args(["--verbose", "[1,2]", "[2,1]"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stderr(predicate::str::contains("array"));
}

#[test]
fn test_help_flag() {
    jdelta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Structural diff"))
        .stdout(predicate::str::contains("JSON"));
}

#[test]
fn test_version_flag() {
    jdelta()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("jdelta"));
}
