//! Persistence adapter: one JSON blob under a fixed key in the data dir.
//!
//! The whitelist of persisted collections is exactly the fields of
//! `PersistedState`. Transient state (evaluations) lives on `Store` and is
//! never written. Loading shallow-merges onto defaults: fields present in
//! the file win, missing fields fall back to their defaults. A `version`
//! bump alone performs no data migration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::rules::{builtin_rules, Rule};
use crate::models::{BattlePlan, GeneratedKey, Insight, Project, Task, TaskLog, Template, YoutubeRef};
use crate::{Error, Result};

/// Fixed key for the state blob.
pub const STATE_FILE: &str = "state.json";

/// Current state schema version.
pub const STATE_VERSION: u32 = 1;

/// The whitelisted, persisted subset of application state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    /// Schema version of the blob on disk
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub task_logs: Vec<TaskLog>,

    #[serde(default)]
    pub battle_plans: Vec<BattlePlan>,

    #[serde(default)]
    pub templates: Vec<Template>,

    #[serde(default)]
    pub youtube_refs: Vec<YoutubeRef>,

    #[serde(default)]
    pub insights: Vec<Insight>,

    #[serde(default = "builtin_rules")]
    pub rules: Vec<Rule>,

    #[serde(default)]
    pub keys: Vec<GeneratedKey>,

    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    STATE_VERSION
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            projects: Vec::new(),
            tasks: Vec::new(),
            task_logs: Vec::new(),
            battle_plans: Vec::new(),
            templates: Vec::new(),
            youtube_refs: Vec::new(),
            insights: Vec::new(),
            rules: builtin_rules(),
            keys: Vec::new(),
            settings: BTreeMap::new(),
        }
    }
}

/// Resolve the data directory: `PX_DATA_DIR` env var, or the platform data
/// dir under a `pexos` subdirectory.
pub fn resolve_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PX_DATA_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("pexos"))
}

/// Load state from the blob in `dir`, falling back to defaults when the
/// file does not exist yet.
pub fn load(dir: &Path) -> Result<PersistedState> {
    let path = dir.join(STATE_FILE);
    if !path.exists() {
        return Ok(PersistedState::default());
    }

    let contents = fs::read_to_string(&path)?;
    let state: PersistedState = serde_json::from_str(&contents)?;
    Ok(state)
}

/// Write the whole state blob, replacing any previous contents.
pub fn save(dir: &Path, state: &PersistedState) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(STATE_FILE);
    let json = serde_json::to_string(state)?;
    fs::write(&path, json)?;
    Ok(())
}
