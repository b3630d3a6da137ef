//! Integration tests for status, config, system, and the action log.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_bare_px_prints_status_summary() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    env.add_task(&project_id, "Ready work");

    let status = env.px_json(&[]);
    assert_eq!(status["counts"]["projects"], 1);
    assert_eq!(status["counts"]["pending_tasks"], 1);
    assert_eq!(status["ready"][0]["name"], "Ready work");

    env.px()
        .args(["--human"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ready (by ROI):"));
}

#[test]
fn test_config_get_set_list() {
    let env = TestEnv::new();
    let unset = env.px_json(&["config", "get", "theme"]);
    assert!(unset["value"].is_null());

    env.px_json(&["config", "set", "theme", "dark"]);
    let got = env.px_json(&["config", "get", "theme"]);
    assert_eq!(got["value"], "dark");

    let all = env.px_json(&["config", "list"]);
    assert_eq!(all["settings"]["theme"], "dark");
}

#[test]
fn test_system_build_info() {
    let env = TestEnv::new();
    let info = env.px_json(&["system", "build-info"]);
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info["build_timestamp"].is_string());
    assert!(info["git_commit"].is_string());
}

#[test]
fn test_system_path_reports_data_dir() {
    let env = TestEnv::new();
    let path = env.px_json(&["system", "path"]);
    assert_eq!(
        path["path"].as_str().unwrap(),
        env.data_path().to_str().unwrap()
    );
}

#[test]
fn test_system_clear_requires_force() {
    let env = TestEnv::new();
    env.add_project("Precious");

    env.px()
        .args(["system", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    let still_there = env.px_json(&["project", "list"]);
    assert_eq!(still_there["projects"].as_array().unwrap().len(), 1);

    env.px_json(&["system", "clear", "--force"]);
    let cleared = env.px_json(&["project", "list"]);
    assert!(cleared["projects"].as_array().unwrap().is_empty());
}

#[test]
fn test_action_log_records_invocations() {
    let env = TestEnv::new();
    env.add_project("Logged");
    env.px().args(["task", "show", "pxt-none"]).assert().failure();

    let log = std::fs::read_to_string(env.data_path().join("action.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines.len() >= 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["command"], "project add");
    assert_eq!(first["success"], true);

    let last: serde_json::Value = serde_json::from_str(lines[lines.len() - 1]).unwrap();
    assert_eq!(last["command"], "task show");
    assert_eq!(last["success"], false);
    assert!(last["error"].as_str().unwrap().contains("not found"));
}

#[test]
fn test_action_log_can_be_disabled() {
    let env = TestEnv::new();
    env.add_project("Logged");
    env.px_json(&["config", "set", "action_log_enabled", "false"]);
    env.add_project("Unlogged");

    // Only the first add was logged; the setting silences everything after
    let log = std::fs::read_to_string(env.data_path().join("action.log")).unwrap();
    let adds = log.lines().filter(|l| l.contains("project add")).count();
    assert_eq!(adds, 1);
}

#[test]
fn test_evaluations_not_restored_across_invocations() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    env.px_json(&["evaluate", &project_id, "--target", "project"]);

    // Evaluations are session-transient: the whitelisted blob omits them
    let state = std::fs::read_to_string(env.data_path().join("state.json")).unwrap();
    assert!(!state.contains("evaluated_at"));
    assert!(!state.contains("flagged_for_removal"));
}
