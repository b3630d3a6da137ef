//! PEX-OS - a personal command center for projects, tasks, and plans.
//!
//! This library provides the core functionality for the `px` CLI tool:
//! ROI-scored tasks and projects, battle plans, prompt templates, a typed
//! rule engine that synthesizes insights, and a whitelisted JSON store.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod models;
pub mod store;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::Path;
    use tempfile::TempDir;

    use crate::store::Store;

    /// Test environment with an isolated data directory.
    ///
    /// Store-layer tests open the store directly against the temp dir, so
    /// no environment variables are involved and tests stay parallel-safe.
    pub struct TestEnv {
        /// Isolated data directory holding state.json
        pub data_dir: TempDir,
    }

    impl TestEnv {
        /// Create a new test environment with an isolated data directory.
        pub fn new() -> Self {
            Self {
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Open a store rooted at this environment's data directory.
        pub fn open_store(&self) -> Store {
            Store::open_at(self.data_path()).unwrap()
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for PEX-OS operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Task already completed: {0}")]
    AlreadyCompleted(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for PEX-OS operations.
pub type Result<T> = std::result::Result<T, Error>;
