//! Command audit logging for px.
//!
//! Every CLI invocation is appended to a JSONL log file next to the state
//! blob. Logging is best-effort: failures print a warning and never break
//! the command itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store::persist;

/// File name of the JSONL audit log inside the data directory.
pub const ACTION_LOG_FILE: &str = "action.log";

/// A single audit entry for a CLI invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// When the command ran
    pub timestamp: DateTime<Utc>,

    /// Data directory the command operated on
    pub data_dir: String,

    /// Command name (e.g., "task add", "evaluate", "rule run")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Append an audit entry for a command invocation.
///
/// Never fails: problems are reported as warnings on stderr so logging
/// cannot break the command being logged.
pub fn log_action(
    data_dir: &Path,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let settings = persist::load(data_dir)
        .map(|state| state.settings)
        .unwrap_or_default();

    let enabled = settings
        .get("action_log_enabled")
        .map(|v| parse_bool(v))
        .unwrap_or(true);
    if !enabled {
        return;
    }

    let sanitize = settings
        .get("action_log_sanitize")
        .map(|v| parse_bool(v))
        .unwrap_or(true);
    let logged_args = if sanitize { sanitize_args(&args) } else { args };

    let entry = ActionLog {
        timestamp: Utc::now(),
        data_dir: data_dir.to_string_lossy().to_string(),
        command: command.to_string(),
        args: logged_args,
        success,
        error,
        duration_ms,
        user: current_user(),
    };

    if let Err(e) = write_log_entry(&log_path(data_dir), &entry) {
        eprintln!("Warning: Failed to write action log: {}", e);
    }
}

/// Path of the audit log inside the data directory.
pub fn log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ACTION_LOG_FILE)
}

fn write_log_entry(path: &Path, entry: &ActionLog) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry).map_err(std::io::Error::other)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

fn parse_bool(value: &str) -> bool {
    let v = value.to_lowercase();
    v == "true" || v == "1" || v == "yes"
}

/// Sanitize arguments to keep key material and long values out of the log.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    match args {
        serde_json::Value::Object(map) => {
            let mut sanitized = serde_json::Map::new();
            for (key, value) in map {
                let key_lower = key.to_lowercase();
                if key_lower.contains("password")
                    || key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower == "key"
                {
                    sanitized.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    sanitized.insert(key.clone(), sanitize_args(value));
                }
            }
            serde_json::Value::Object(sanitized)
        }
        serde_json::Value::Array(arr) => {
            if arr.len() > 10 {
                serde_json::Value::String(format!("[Array with {} items]", arr.len()))
            } else {
                serde_json::Value::Array(arr.iter().map(sanitize_args).collect())
            }
        }
        serde_json::Value::String(s) => {
            if s.len() > 100 {
                // Back off to a char boundary so multi-byte text cannot panic
                let mut cut = 97;
                while !s.is_char_boundary(cut) {
                    cut -= 1;
                }
                serde_json::Value::String(format!("{}... ({} chars)", &s[..cut], s.len()))
            } else {
                serde_json::Value::String(s.clone())
            }
        }
        _ => args.clone(),
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_sanitize_sensitive_keys() {
        let value = serde_json::json!({
            "user_name": "athena",
            "password": "secret123",
            "api_token": "abc123",
            "key": "pex-deadbeef",
            "name": "My task"
        });
        let sanitized = sanitize_args(&value);

        assert_eq!(sanitized["user_name"], "athena");
        assert_eq!(sanitized["password"], "[REDACTED]");
        assert_eq!(sanitized["api_token"], "[REDACTED]");
        assert_eq!(sanitized["key"], "[REDACTED]");
        assert_eq!(sanitized["name"], "My task");
    }

    #[test]
    fn test_sanitize_long_string() {
        let long_str = "a".repeat(150);
        let sanitized = sanitize_args(&serde_json::json!(long_str));
        if let serde_json::Value::String(s) = sanitized {
            assert!(s.contains("... (150 chars)"));
        } else {
            panic!("Expected string value");
        }
    }

    #[test]
    fn test_sanitize_long_multibyte_string() {
        let long_str = "é".repeat(60);
        assert!(long_str.len() > 100);
        let sanitized = sanitize_args(&serde_json::json!(long_str));
        if let serde_json::Value::String(s) = sanitized {
            assert!(s.ends_with("... (120 chars)"));
            assert!(s.starts_with('é'));
        } else {
            panic!("Expected string value");
        }
    }

    #[test]
    fn test_sanitize_large_array() {
        let arr: Vec<i32> = (0..15).collect();
        let sanitized = sanitize_args(&serde_json::json!(arr));
        assert_eq!(sanitized, serde_json::json!("[Array with 15 items]"));
    }

    #[test]
    fn test_sanitize_nested_object() {
        let value = serde_json::json!({
            "plan": {
                "name": "Q3",
                "secret_phrase": "hidden"
            },
            "tags": ["a", "b"]
        });
        let sanitized = sanitize_args(&value);
        assert_eq!(sanitized["plan"]["name"], "Q3");
        assert_eq!(sanitized["plan"]["secret_phrase"], "[REDACTED]");
        assert_eq!(sanitized["tags"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_log_action_appends_jsonl() {
        let env = TestEnv::new();
        let dir = env.data_path();

        log_action(
            dir,
            "task add",
            serde_json::json!({"name": "demo"}),
            true,
            None,
            12,
        );
        log_action(
            dir,
            "task complete",
            serde_json::json!({"id": "pxt-1234"}),
            false,
            Some("Task not found: pxt-1234".to_string()),
            3,
        );

        let contents = std::fs::read_to_string(log_path(dir)).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ActionLog = serde_json::from_str(lines[0]).unwrap();
        assert!(first.success);
        assert_eq!(first.command, "task add");
        let second: ActionLog = serde_json::from_str(lines[1]).unwrap();
        assert!(!second.success);
        assert!(second.error.is_some());
    }

    #[test]
    fn test_log_action_respects_disable_setting() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        store.set_setting("action_log_enabled".to_string(), "false".to_string());
        store.save().unwrap();

        log_action(
            env.data_path(),
            "task add",
            serde_json::json!({}),
            true,
            None,
            1,
        );
        assert!(!log_path(env.data_path()).exists());
    }
}
