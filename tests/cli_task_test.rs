//! Integration tests for task commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_task_add_computes_roi() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");

    let task = env.px_json(&[
        "task", "add", &project_id, "Ship feature", "--impact", "8", "--effort", "4",
    ]);
    assert!(task["id"].as_str().unwrap().starts_with("pxt-"));
    assert_eq!(task["roi_score"], 2.0);
    assert_eq!(task["status"], "pending");
}

#[test]
fn test_task_add_requires_existing_project() {
    let env = TestEnv::new();
    env.px()
        .args(["task", "add", "pxp-none", "Orphan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found"));
}

#[test]
fn test_task_lifecycle() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Lifecycle");

    let started = env.px_json(&["task", "start", &id]);
    assert_eq!(started["status"], "in_progress");
    assert!(started["started_at"].is_string());

    let done = env.px_json(&["task", "complete", &id, "--minutes", "42"]);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["actual_minutes"], 42);
    assert!(done["completed_at"].is_string());
}

#[test]
fn test_task_double_completion_rejected() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Once");

    env.px_json(&["task", "complete", &id]);
    env.px()
        .args(["task", "complete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already completed"));

    // Derived counts unaffected by the rejected call
    let project = env.px_json(&["project", "show", &project_id]);
    assert_eq!(project["progress"]["completed_tasks_count"], 1);
}

#[test]
fn test_task_block_accumulates_blockers() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Stuck");

    env.px_json(&["task", "block", &id, "waiting on review"]);
    let blocked = env.px_json(&["task", "block", &id, "waiting on CI"]);
    assert_eq!(blocked["status"], "blocked");
    assert_eq!(blocked["blockers"].as_array().unwrap().len(), 2);

    // Restarting keeps the blocker history
    let restarted = env.px_json(&["task", "start", &id]);
    assert_eq!(restarted["status"], "in_progress");
    assert_eq!(restarted["blockers"].as_array().unwrap().len(), 2);
}

#[test]
fn test_task_cancel_blocks_further_transitions() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Descoped");

    let cancelled = env.px_json(&["task", "cancel", &id, "--note", "not needed"]);
    assert_eq!(cancelled["status"], "cancelled");

    env.px().args(["task", "start", &id]).assert().failure();
    env.px().args(["task", "complete", &id]).assert().failure();
}

#[test]
fn test_task_update_recomputes_roi_and_logs() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Rescore");

    let updated = env.px_json(&["task", "update", &id, "--impact", "9", "--effort", "3"]);
    assert_eq!(updated["roi_score"], 3.0);

    let logs = env.px_json(&["log", &id]);
    let entries = logs["logs"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    // Newest first
    assert_eq!(entries[0]["action"], "updated");
    assert_eq!(entries[1]["action"], "created");
}

#[test]
fn test_task_add_then_delete_roundtrip() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let id = env.add_task(&project_id, "Ephemeral");

    env.px_json(&["task", "delete", &id]);

    let tasks = env.px_json(&["task", "list"]);
    assert!(tasks["tasks"].as_array().unwrap().is_empty());
    let project = env.px_json(&["project", "show", &project_id]);
    assert_eq!(project["progress"]["tasks_count"], 0);

    // Audit trail survives the delete
    let logs = env.px_json(&["log", &id]);
    assert_eq!(logs["logs"].as_array().unwrap().len(), 1);
}

#[test]
fn test_task_list_filters() {
    let env = TestEnv::new();
    let project_id = env.add_project("P");
    let a = env.add_task(&project_id, "A");
    env.add_task(&project_id, "B");
    env.px_json(&["task", "start", &a]);

    let pending = env.px_json(&["task", "list", "--status", "pending"]);
    assert_eq!(pending["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(pending["tasks"][0]["name"], "B");

    let by_project = env.px_json(&["task", "list", "--project", &project_id]);
    assert_eq!(by_project["tasks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_error_output_is_valid_json() {
    let env = TestEnv::new();

    // Quotes in the offending id must not break the JSON error envelope
    let assert = env
        .px()
        .args(["task", "show", r#"pxt-"quoted""#])
        .assert()
        .failure();
    let stderr = &assert.get_output().stderr;
    let parsed: serde_json::Value = serde_json::from_slice(stderr).unwrap();
    assert!(parsed["error"].as_str().unwrap().contains(r#"pxt-"quoted""#));
}

#[test]
fn test_state_persists_across_invocations() {
    let env = TestEnv::new();
    let project_id = env.add_project("Durable");
    let task_id = env.add_task(&project_id, "Also durable");

    // Fresh process reads the same state file
    let shown = env.px_json(&["task", "show", &task_id]);
    assert_eq!(shown["name"], "Also durable");
    assert!(env.data_path().join("state.json").exists());
}
