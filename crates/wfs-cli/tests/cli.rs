//! Binary-level tests for the `wfs` command

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CATALOG: &str = r#"
company: Acme
engine:
  picker_order: sort_order
statuses:
  - name: Open
    sort_order: 1
  - name: In Progress
    sort_order: 2
  - name: Done
    sort_order: 3
  - name: Draft
workflows:
  - name: Default
    transitions:
      - to: Open
      - from: Open
        to: In Progress
      - from: In Progress
        to: Done
        role: MANAGER
  - name: Meetings
types:
  - name: Bug
    category: issue
    workflow: Default
  - name: Standup
    category: meeting
    workflow: Meetings
"#;

fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("catalog.yaml");
    fs::write(&path, CATALOG).unwrap();
    path
}

fn wfs(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wfs"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn init_reports_default_type_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());

    let output = wfs(&["init", catalog.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "Bug: Open");
}

#[test]
fn init_fails_for_workflow_without_initial_rule() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());

    let output = wfs(&["init", catalog.to_str().unwrap(), "--category", "meeting"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Meetings"));
}

#[test]
fn next_respects_roles() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());
    let path = catalog.to_str().unwrap();

    let output = wfs(&["next", path, "--status", "In Progress"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "");

    let output = wfs(&["next", path, "--status", "In Progress", "--role", "MANAGER"]);
    assert_eq!(stdout(&output).trim(), "Done");
}

#[test]
fn next_json_lists_statuses() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());

    let output = wfs(&["next", catalog.to_str().unwrap(), "--type", "Bug", "--picker", "--json"]);
    assert!(output.status.success());

    let statuses: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = statuses
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Open"]);
}

#[test]
fn transition_exit_code_reflects_decision() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());
    let path = catalog.to_str().unwrap();

    let allowed = wfs(&["transition", path, "--from", "Open", "--to", "In Progress"]);
    assert!(allowed.status.success());
    assert_eq!(stdout(&allowed).trim(), "allowed");

    let denied = wfs(&["transition", path, "--from", "Open", "--to", "Done"]);
    assert!(!denied.status.success());
    assert_eq!(stdout(&denied).trim(), "denied");

    let same = wfs(&["transition", path, "--from", "Done", "--to", "Done"]);
    assert!(same.status.success());
}

#[test]
fn check_flags_workflows_without_initial_status() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write_catalog(dir.path());

    let output = wfs(&["check", catalog.to_str().unwrap(), "--json"]);
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["company"], "Acme");
    assert_eq!(report["statuses"], 4);
    assert_eq!(report["workflows"][0]["terminal"][0], "Done");
    assert_eq!(report["problems"].as_array().unwrap().len(), 1);
}

#[test]
fn missing_manifest_is_an_error() {
    let output = wfs(&["check", "/nonexistent/catalog.yaml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("/nonexistent/catalog.yaml"));
}
