//! Common test utilities for px integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's real data directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with an isolated data directory.
///
/// The `px()` method returns a `Command` that sets `PX_DATA_DIR`
/// per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the px binary with an isolated data directory.
    pub fn px(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_px"));
        cmd.env("PX_DATA_DIR", self.data_dir.path());
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Run px with the given args and parse the JSON output.
    pub fn px_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.px().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "px {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    /// Create a project and return its id.
    pub fn add_project(&self, name: &str) -> String {
        self.px_json(&["project", "add", name])["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create a task under a project and return its id.
    pub fn add_task(&self, project_id: &str, name: &str) -> String {
        self.px_json(&["task", "add", project_id, name])["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
