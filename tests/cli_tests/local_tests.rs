//! Tests for the `nestdb` local-mode binary
//!
//! These tests verify:
//! - Exit code 0 on success, 1 on usage and operation errors
//! - Results on stdout, errors on stderr

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn run_local(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nestdb"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_arguments_exit_with_one() {
    let temp = TempDir::new().unwrap();
    let output = run_local(temp.path(), &["onlydb"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_unknown_operation_exits_with_one() {
    let temp = TempDir::new().unwrap();
    let output = run_local(temp.path(), &["d", "bogus", "{}"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_exits_with_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_nestdb"))
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("insert"));
}

#[test]
fn test_invalid_json_exits_with_one() {
    let temp = TempDir::new().unwrap();
    let output = run_local(temp.path(), &["shop", "insert", "{name: Alice}"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

// =============================================================================
// Operation Tests
// =============================================================================

#[test]
fn test_insert_find_delete() {
    let temp = TempDir::new().unwrap();

    let output = run_local(temp.path(), &["shop", "insert", r#"{"_id": "a", "age": 25}"#]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Document inserted successfully (_id: a)"));
    assert!(stdout(&output).contains("microseconds"));
    assert!(temp.path().join("shop").join("shop.json").is_file());

    let output = run_local(temp.path(), &["shop", "find", r#"'{"age": {"$gt": 20}}'"#]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Found 1 document(s)"));

    let output = run_local(temp.path(), &["shop", "delete", r#"{"_id": "a"}"#]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Deleted 1 document(s)"));
}

#[test]
fn test_unknown_operator_exits_with_one() {
    let temp = TempDir::new().unwrap();
    let output = run_local(temp.path(), &["shop", "find", r#"{"age": {"$gte": 1}}"#]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("$gte"));
}
