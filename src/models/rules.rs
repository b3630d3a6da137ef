//! Declarative productivity rules evaluated against the live task list.
//!
//! Each rule pairs a typed `Condition` with a suggested action. Running the
//! rules produces one match per (rule, task) pair; the store turns matches
//! into `Insight` records and bumps the rule's trigger count.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Priority, Task, TaskStatus};

/// A typed predicate over a task, evaluated at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Task ROI is below `threshold` and the task is older than `after_hours`.
    RoiBelow { threshold: f64, after_hours: i64 },
    /// Task has been in blocked status for longer than `hours`.
    BlockedLongerThan { hours: i64 },
    /// Task has been in progress for longer than `hours` without completing.
    StaleInProgress { hours: i64 },
    /// Actual minutes exceed the estimate by more than `factor`.
    EstimateOverrun { factor: f64 },
}

impl Condition {
    /// Evaluate this condition against a task.
    ///
    /// Returns a human-readable reason when the condition matches.
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> Option<String> {
        match self {
            Condition::RoiBelow {
                threshold,
                after_hours,
            } => {
                if task.status == TaskStatus::Completed || task.status == TaskStatus::Cancelled {
                    return None;
                }
                let age = now.signed_duration_since(task.created_at);
                if task.roi_score < *threshold && age > Duration::hours(*after_hours) {
                    Some(format!(
                        "ROI {:.1} has stayed below {:.1} for over {}h",
                        task.roi_score, threshold, after_hours
                    ))
                } else {
                    None
                }
            }
            Condition::BlockedLongerThan { hours } => {
                if task.status != TaskStatus::Blocked {
                    return None;
                }
                // updated_at moves on every mutation, so the block transition
                // is the most recent change for a still-blocked task.
                let blocked_for = now.signed_duration_since(task.updated_at);
                if blocked_for > Duration::hours(*hours) {
                    Some(format!(
                        "blocked for over {}h ({} blocker(s) recorded)",
                        hours,
                        task.blockers.len()
                    ))
                } else {
                    None
                }
            }
            Condition::StaleInProgress { hours } => {
                if task.status != TaskStatus::InProgress {
                    return None;
                }
                let started = task.started_at?;
                if now.signed_duration_since(started) > Duration::hours(*hours) {
                    Some(format!("in progress for over {}h without completing", hours))
                } else {
                    None
                }
            }
            Condition::EstimateOverrun { factor } => {
                let estimated = task.estimated_minutes?;
                let actual = task.actual_minutes?;
                if estimated == 0 {
                    return None;
                }
                let ratio = actual as f64 / estimated as f64;
                if ratio > *factor {
                    Some(format!(
                        "actual {}min is {:.1}x the {}min estimate",
                        actual, ratio, estimated
                    ))
                } else {
                    None
                }
            }
        }
    }
}

/// A productivity rule: a condition, a suggested action, and run state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier (e.g., "rule-low-roi")
    pub id: String,

    /// Display name
    pub name: String,

    /// When the rule fires
    pub condition: Condition,

    /// What to do about it
    pub action: String,

    /// Disabled rules are skipped by `run`
    #[serde(default)]
    pub enabled: bool,

    /// Priority of the synthesized insights
    #[serde(default)]
    pub priority: Priority,

    /// How many matches this rule has produced across all runs
    #[serde(default)]
    pub trigger_count: u32,
}

/// A single rule/task match produced by `run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub rule_id: String,
    pub rule_name: String,
    pub task_id: String,
    pub task_name: String,
    pub reason: String,
    pub action: String,
}

/// The fixed set of built-in rules.
///
/// All rules ship enabled; `toggle` flips individual rules off.
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "rule-low-roi".to_string(),
            name: "Low-ROI flag".to_string(),
            condition: Condition::RoiBelow {
                threshold: 1.0,
                after_hours: 48,
            },
            action: "Consider eliminating or delegating this task".to_string(),
            enabled: true,
            priority: Priority::Medium,
            trigger_count: 0,
        },
        Rule {
            id: "rule-blocked-pivot".to_string(),
            name: "Blocked-task pivot".to_string(),
            condition: Condition::BlockedLongerThan { hours: 24 },
            action: "Escalate the blocker or pivot to another task".to_string(),
            enabled: true,
            priority: Priority::High,
            trigger_count: 0,
        },
        Rule {
            id: "rule-procrastination".to_string(),
            name: "Procrastination detection".to_string(),
            condition: Condition::StaleInProgress { hours: 72 },
            action: "Break the task down or timebox the remainder".to_string(),
            enabled: true,
            priority: Priority::Medium,
            trigger_count: 0,
        },
        Rule {
            id: "rule-estimate-overrun".to_string(),
            name: "Estimate overrun".to_string(),
            condition: Condition::EstimateOverrun { factor: 2.0 },
            action: "Review the estimate and re-scope similar tasks".to_string(),
            enabled: true,
            priority: Priority::Low,
            trigger_count: 0,
        },
    ]
}

/// Evaluate enabled rules against the task list.
///
/// Returns matches in rule order; each (rule, task) pair appears at most
/// once per run.
pub fn run(rules: &[Rule], tasks: &[Task], now: DateTime<Utc>) -> Vec<RuleMatch> {
    let mut matches = Vec::new();
    for rule in rules.iter().filter(|r| r.enabled) {
        for task in tasks {
            if let Some(reason) = rule.condition.matches(task, now) {
                matches.push(RuleMatch {
                    rule_id: rule.id.clone(),
                    rule_name: rule.name.clone(),
                    task_id: task.id.clone(),
                    task_name: task.name.clone(),
                    reason,
                    action: rule.action.clone(),
                });
            }
        }
    }
    matches
}
