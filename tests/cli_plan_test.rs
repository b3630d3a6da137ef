//! Integration tests for battle plan commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn add_plan(env: &TestEnv, name: &str) -> String {
    env.px_json(&["plan", "add", name])["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_plan_add_defaults_to_sprint() {
    let env = TestEnv::new();
    let plan = env.px_json(&["plan", "add", "Q3 push"]);
    assert!(plan["id"].as_str().unwrap().starts_with("pxb-"));
    assert_eq!(plan["plan_type"], "sprint");
    assert_eq!(plan["status"], "active");
}

#[test]
fn test_plan_objective_flow() {
    let env = TestEnv::new();
    let plan_id = add_plan(&env, "Q3");

    let plan = env.px_json(&[
        "plan", "objective-add", &plan_id, "Ship v1", "--priority", "high",
    ]);
    assert_eq!(plan["objectives"][0]["id"], "obj-1");
    assert_eq!(plan["objectives"][0]["status"], "pending");

    let plan = env.px_json(&["plan", "objective-status", &plan_id, "obj-1", "completed"]);
    assert_eq!(plan["objectives"][0]["status"], "completed");
}

#[test]
fn test_plan_objective_link_requires_task() {
    let env = TestEnv::new();
    let plan_id = add_plan(&env, "Q3");
    env.px_json(&["plan", "objective-add", &plan_id, "Ship v1"]);

    env.px()
        .args(["plan", "objective-link", &plan_id, "obj-1", "pxt-none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));

    let project_id = env.add_project("P");
    let task_id = env.add_task(&project_id, "Linked work");
    let plan = env.px_json(&["plan", "objective-link", &plan_id, "obj-1", &task_id]);
    assert_eq!(plan["objectives"][0]["linked_tasks"][0], task_id.as_str());
}

#[test]
fn test_plan_pivot_triggers() {
    let env = TestEnv::new();
    let plan_id = add_plan(&env, "Q3");

    let plan = env.px_json(&[
        "plan",
        "pivot-add",
        &plan_id,
        "v1 slips past October",
        "cut scope to core flows",
    ]);
    assert_eq!(plan["pivot_triggers"][0]["triggered"], false);

    let plan = env.px_json(&["plan", "pivot-fire", &plan_id, "0"]);
    assert_eq!(plan["pivot_triggers"][0]["triggered"], true);

    env.px()
        .args(["plan", "pivot-fire", &plan_id, "7"])
        .assert()
        .failure();
}

#[test]
fn test_plan_metrics_snapshot_is_stored_verbatim() {
    let env = TestEnv::new();
    let plan_id = add_plan(&env, "Q3");

    // Snapshot is whatever the caller supplies, not derived from objectives
    let plan = env.px_json(&[
        "plan",
        "metrics",
        &plan_id,
        "--objectives-total",
        "10",
        "--objectives-completed",
        "3",
        "--progress",
        "30",
    ]);
    assert_eq!(plan["metrics"]["objectives_total"], 10);
    assert_eq!(plan["metrics"]["progress_percentage"], 30.0);
}

#[test]
fn test_plan_update_and_delete() {
    let env = TestEnv::new();
    let plan_id = add_plan(&env, "Q3");

    let updated = env.px_json(&["plan", "update", &plan_id, "--status", "completed"]);
    assert_eq!(updated["status"], "completed");

    env.px_json(&["plan", "delete", &plan_id]);
    env.px()
        .args(["plan", "show", &plan_id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
