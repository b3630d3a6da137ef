//! Integration tests for reference video and access key commands.

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_ref_add_and_mark_watched() {
    let env = TestEnv::new();
    let added = env.px_json(&[
        "ref",
        "add",
        "Borrow checker deep dive",
        "https://youtube.com/watch?v=abc123",
        "--channel",
        "RustConf",
        "--category",
        "learning",
    ]);
    let id = added["id"].as_str().unwrap();
    assert!(id.starts_with("pxr-"));
    assert_eq!(added["watched"], false);

    let watched = env.px_json(&["ref", "watched", id]);
    assert_eq!(watched["watched"], true);
}

#[test]
fn test_ref_list_unwatched_filter() {
    let env = TestEnv::new();
    let first = env.px_json(&["ref", "add", "One", "https://example.com/1"]);
    env.px_json(&["ref", "add", "Two", "https://example.com/2"]);
    env.px_json(&["ref", "watched", first["id"].as_str().unwrap()]);

    let unwatched = env.px_json(&["ref", "list", "--unwatched"]);
    assert_eq!(unwatched["refs"].as_array().unwrap().len(), 1);
    assert_eq!(unwatched["refs"][0]["title"], "Two");
}

#[test]
fn test_ref_update_and_delete() {
    let env = TestEnv::new();
    let added = env.px_json(&["ref", "add", "One", "https://example.com/1"]);
    let id = added["id"].as_str().unwrap();

    let updated = env.px_json(&["ref", "update", id, "--notes", "watch at 2x"]);
    assert_eq!(updated["notes"], "watch at 2x");

    env.px_json(&["ref", "delete", id]);
    env.px().args(["ref", "show", id]).assert().failure();
}

#[test]
fn test_key_generate_and_revoke() {
    let env = TestEnv::new();
    let key = env.px_json(&["key", "generate", "athena"]);
    let id = key["id"].as_str().unwrap();
    assert!(id.starts_with("pxk-"));
    assert!(key["key"].as_str().unwrap().starts_with("pex-"));
    assert_eq!(key["active"], true);

    let revoked = env.px_json(&["key", "revoke", id]);
    assert_eq!(revoked["active"], false);

    // Revocation persists across invocations and keeps the record
    let all = env.px_json(&["key", "list"]);
    assert_eq!(all["keys"].as_array().unwrap().len(), 1);
    let active = env.px_json(&["key", "list", "--active"]);
    assert!(active["keys"].as_array().unwrap().is_empty());
}

#[test]
fn test_key_revoke_missing_fails() {
    let env = TestEnv::new();
    env.px()
        .args(["key", "revoke", "pxk-none"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Key not found"));
}
