//! Integration tests for template commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

fn add_template(env: &TestEnv) -> String {
    let template = env.px_json(&[
        "template",
        "add",
        "Refactor prompt",
        "Refactor {{file}} toward {{goal}}",
        "--category",
        "coding",
    ]);
    template["id"].as_str().unwrap().to_string()
}

#[test]
fn test_template_add_and_list() {
    let env = TestEnv::new();
    let id = add_template(&env);
    assert!(id.starts_with("pxm-"));

    let list = env.px_json(&["template", "list", "--category", "coding"]);
    assert_eq!(list["templates"].as_array().unwrap().len(), 1);
    let none = env.px_json(&["template", "list", "--category", "writing"]);
    assert!(none["templates"].as_array().unwrap().is_empty());
}

#[test]
fn test_template_render_substitutes_variables() {
    let env = TestEnv::new();
    let id = add_template(&env);
    env.px_json(&["template", "var-add", &id, "file", "--required"]);
    env.px_json(&["template", "var-add", &id, "goal"]);

    let rendered = env.px_json(&[
        "template", "render", &id, "--var", "file=store.rs", "--var", "goal=clarity",
    ]);
    assert_eq!(rendered["rendered"], "Refactor store.rs toward clarity");

    // Rendering counts as a use
    let template = env.px_json(&["template", "show", &id]);
    assert_eq!(template["usage_count"], 1);
}

#[test]
fn test_template_render_missing_required_variable() {
    let env = TestEnv::new();
    let id = add_template(&env);
    env.px_json(&["template", "var-add", &id, "file", "--required"]);

    env.px()
        .args(["template", "render", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required variable: file"));
}

#[test]
fn test_template_select_variable_validates_options() {
    let env = TestEnv::new();
    let template = env.px_json(&["template", "add", "Sized", "A {{size}} thing"]);
    let id = template["id"].as_str().unwrap();
    env.px_json(&[
        "template", "var-add", id, "size", "--type", "select", "--option", "small", "--option",
        "large",
    ]);

    env.px()
        .args(["template", "render", id, "--var", "size=medium"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in options"));

    let rendered = env.px_json(&["template", "render", id, "--var", "size=large"]);
    assert_eq!(rendered["rendered"], "A large thing");
}

#[test]
fn test_template_use_and_rate() {
    let env = TestEnv::new();
    let id = add_template(&env);

    env.px_json(&["template", "use", &id]);
    let used = env.px_json(&["template", "use", &id]);
    assert_eq!(used["usage_count"], 2);

    env.px_json(&["template", "rate", &id, "4"]);
    let rated = env.px_json(&["template", "rate", &id, "5"]);
    assert_eq!(rated["avg_rating"], 4.5);
    assert_eq!(rated["ratings_count"], 2);

    env.px()
        .args(["template", "rate", &id, "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 5"));
}

#[test]
fn test_template_duplicate_variable_rejected() {
    let env = TestEnv::new();
    let id = add_template(&env);
    env.px_json(&["template", "var-add", &id, "file"]);
    env.px()
        .args(["template", "var-add", &id, "file"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already declared"));
}
