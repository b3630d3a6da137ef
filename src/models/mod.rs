//! Data models for PEX-OS entities.
//!
//! This module defines the core data structures:
//! - `Project` - Long-running efforts with impact and ROI scores
//! - `Task` - Work items with effort/impact scoring, blockers, dependencies
//! - `TaskLog` - Append-only audit records for task mutations
//! - `BattlePlan` - Objective/pivot-trigger plans with a metrics snapshot
//! - `Template` - Prompt templates with `{{variable}}` placeholders
//! - `YoutubeRef` - Reference videos with watch state
//! - `Insight` - Human-readable records synthesized by the rule engine
//! - `GeneratedKey` - Soft-deletable access keys
//! - `Evaluation` - Keep/kill verdicts produced by `evaluate`

pub mod roi;
pub mod rules;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project status in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
    Completed,
    OnHold,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "archived" => Ok(ProjectStatus::Archived),
            "completed" => Ok(ProjectStatus::Completed),
            "on_hold" | "on-hold" | "onhold" => Ok(ProjectStatus::OnHold),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

/// Priority level shared by projects, tasks, and plan objectives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Blocked,
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// A long-running effort that owns tasks.
///
/// Task counts are never stored on the project; they are derived from the
/// task collection on demand (see `Store::project_progress`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier (e.g., "pxp-a1b2")
    pub id: String,

    /// Project name
    pub name: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Current status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Impact score (0-10)
    #[serde(default)]
    pub impact_score: u8,

    /// Derived ROI score (recomputed on impact changes)
    #[serde(default)]
    pub roi_score: f64,

    /// Owner name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Planned start date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Deadline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with the given ID and name.
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            description: None,
            status: ProjectStatus::default(),
            priority: Priority::default(),
            impact_score: 5,
            roi_score: 0.0,
            owner: None,
            tags: Vec::new(),
            start_date: None,
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Derived progress statistics for a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectProgress {
    /// Total number of tasks referencing the project
    pub tasks_count: usize,
    /// Number of completed tasks
    pub completed_tasks_count: usize,
    /// Completion percentage (0-100)
    pub percentage: f64,
}

impl ProjectProgress {
    /// Create new progress stats.
    pub fn new(tasks_count: usize, completed_tasks_count: usize) -> Self {
        let percentage = if tasks_count > 0 {
            (completed_tasks_count as f64 / tasks_count as f64) * 100.0
        } else {
            0.0
        };
        Self {
            tasks_count,
            completed_tasks_count,
            percentage,
        }
    }
}

/// A work item tracked by PEX-OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (e.g., "pxt-a1b2")
    pub id: String,

    /// Owning project ID (back-link, not an ownership edge)
    pub project_id: String,

    /// Task name
    pub name: String,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Impact score (0-10)
    #[serde(default)]
    pub impact_score: u8,

    /// Effort score (0-10)
    #[serde(default)]
    pub effort_score: u8,

    /// Derived ROI score (impact/effort, one-decimal rounding)
    #[serde(default)]
    pub roi_score: f64,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-text blockers, in the order they were recorded
    #[serde(default)]
    pub blockers: Vec<String>,

    /// Task IDs this task depends on (no cycle detection)
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Estimated minutes of work
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<u32>,

    /// Actual minutes spent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_minutes: Option<u32>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// When work started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the task completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new task with the given ID, project, and name.
    pub fn new(id: String, project_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            name,
            status: TaskStatus::default(),
            priority: Priority::default(),
            impact_score: 5,
            effort_score: 5,
            roi_score: 0.0,
            tags: Vec::new(),
            blockers: Vec::new(),
            dependencies: Vec::new(),
            estimated_minutes: None,
            actual_minutes: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }
}

/// Action recorded in a task audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    Created,
    Updated,
    Started,
    Completed,
    Blocked,
    Cancelled,
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskAction::Created => "created",
            TaskAction::Updated => "updated",
            TaskAction::Started => "started",
            TaskAction::Completed => "completed",
            TaskAction::Blocked => "blocked",
            TaskAction::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Append-only audit record for a task mutation.
///
/// Never mutated or pruned; unbounded growth is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLog {
    /// Unique identifier (e.g., "pxl-a1b2")
    pub id: String,

    /// Task this entry belongs to
    pub task_id: String,

    /// What happened
    pub action: TaskAction,

    /// Optional free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// When it happened
    pub timestamp: DateTime<Utc>,
}

impl TaskLog {
    /// Create a new log entry for a task action.
    pub fn new(id: String, task_id: String, action: TaskAction, note: Option<String>) -> Self {
        Self {
            id,
            task_id,
            action,
            note,
            timestamp: Utc::now(),
        }
    }
}

/// An objective inside a battle plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective identifier, unique within the plan
    pub id: String,

    /// What must be achieved
    pub description: String,

    /// Priority level
    #[serde(default)]
    pub priority: Priority,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Task IDs contributing to this objective
    #[serde(default)]
    pub linked_tasks: Vec<String>,

    /// How completion is judged
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_criteria: Option<String>,

    /// Free-text blockers
    #[serde(default)]
    pub blockers: Vec<String>,
}

/// A condition/action pair that signals when a plan should pivot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotTrigger {
    /// Condition that fires the trigger (free text, plan-level intent)
    pub condition: String,

    /// What to do when it fires
    pub action: String,

    /// Whether the trigger has fired
    #[serde(default)]
    pub triggered: bool,
}

/// Externally supplied metrics snapshot for a battle plan.
///
/// The store records whatever the caller supplies; nothing here is
/// recomputed from objectives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    pub objectives_total: u32,
    pub objectives_completed: u32,
    pub blocker_count: u32,
    pub velocity_score: f64,
    pub progress_percentage: f64,
}

/// A battle plan: objectives, pivot triggers, and a metrics snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlePlan {
    /// Unique identifier (e.g., "pxb-a1b2")
    pub id: String,

    /// Plan name
    pub name: String,

    /// Plan type (e.g., "sprint", "quarter", "launch")
    #[serde(default = "default_plan_type")]
    pub plan_type: String,

    /// Current status
    #[serde(default)]
    pub status: ProjectStatus,

    /// Plan start date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Plan end date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Objectives in priority order
    #[serde(default)]
    pub objectives: Vec<Objective>,

    /// Pivot triggers
    #[serde(default)]
    pub pivot_triggers: Vec<PivotTrigger>,

    /// Latest externally supplied metrics snapshot
    #[serde(default)]
    pub metrics: PlanMetrics,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

fn default_plan_type() -> String {
    "sprint".to_string()
}

impl BattlePlan {
    /// Create a new battle plan with the given ID and name.
    pub fn new(id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            plan_type: default_plan_type(),
            status: ProjectStatus::default(),
            start_date: None,
            end_date: None,
            objectives: Vec::new(),
            pivot_triggers: Vec::new(),
            metrics: PlanMetrics::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Variable type for template placeholders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    #[default]
    Text,
    Number,
    Select,
}

impl std::str::FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(VariableType::Text),
            "number" => Ok(VariableType::Number),
            "select" => Ok(VariableType::Select),
            _ => Err(format!("Unknown variable type: {}", s)),
        }
    }
}

/// A declared placeholder in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariable {
    /// Placeholder name as it appears inside `{{...}}`
    pub name: String,

    /// Variable type
    #[serde(default)]
    pub var_type: VariableType,

    /// Whether a value must be supplied when rendering
    #[serde(default)]
    pub required: bool,

    /// Allowed values for select-type variables
    #[serde(default)]
    pub options: Vec<String>,
}

/// A prompt template with `{{variable}}` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier (e.g., "pxm-a1b2")
    pub id: String,

    /// Template name
    pub name: String,

    /// Category for grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Template body with `{{variable}}` placeholders
    pub content: String,

    /// Declared variables in order
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,

    /// Times the template has been rendered
    #[serde(default)]
    pub usage_count: u32,

    /// Running average rating (0 when unrated)
    #[serde(default)]
    pub avg_rating: f64,

    /// Number of ratings contributing to the average
    #[serde(default)]
    pub ratings_count: u32,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a new template with the given ID, name, and content.
    pub fn new(id: String, name: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            category: None,
            content,
            variables: Vec::new(),
            usage_count: 0,
            avg_rating: 0.0,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reference video tracked for later study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YoutubeRef {
    /// Unique identifier (e.g., "pxr-a1b2")
    pub id: String,

    /// Video title
    pub title: String,

    /// Video URL
    pub url: String,

    /// Channel name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Category for grouping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Whether the video has been watched
    #[serde(default)]
    pub watched: bool,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl YoutubeRef {
    /// Create a new reference with the given ID, title, and URL.
    pub fn new(id: String, title: String, url: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            url,
            channel: None,
            category: None,
            notes: None,
            watched: false,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A human-readable record synthesized by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    /// Unique identifier (e.g., "pxi-a1b2")
    pub id: String,

    /// Short headline
    pub title: String,

    /// Full text
    pub body: String,

    /// Category (mirrors the rule that produced it)
    pub category: String,

    /// Rule that synthesized this insight, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A generated access key. Revocation flips `active` to false; the record
/// is never removed and key values are never checked for reuse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedKey {
    /// Unique identifier (e.g., "pxk-a1b2")
    pub id: String,

    /// The key material
    pub key: String,

    /// Who the key was issued to
    pub user_name: String,

    /// False once revoked
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Target type for an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalTarget {
    Task,
    Project,
}

impl fmt::Display for EvalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvalTarget::Task => "task",
            EvalTarget::Project => "project",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for EvalTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(EvalTarget::Task),
            "project" => Ok(EvalTarget::Project),
            _ => Err(format!("Unknown evaluation target: {}", s)),
        }
    }
}

/// A keep/kill verdict for a task or project.
///
/// At most one evaluation is kept per target id; re-evaluating evicts the
/// older record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// The evaluated entity's id
    pub target_id: String,

    /// Whether the target was a task or a project
    pub target_type: EvalTarget,

    /// Computed ROI
    pub roi: f64,

    /// Recommendation bucket
    pub recommendation: roi::Recommendation,

    /// Priority bucket
    pub priority: Priority,

    /// Human-readable reasoning
    pub reasoning: String,

    /// True when roi < 1.0
    pub flagged_for_removal: bool,

    /// When the evaluation was made
    pub evaluated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_serialization_roundtrip() {
        let project = Project::new("pxp-test".to_string(), "Launch".to_string());
        let json = serde_json::to_string(&project).unwrap();
        let deserialized: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project.id, deserialized.id);
        assert_eq!(project.name, deserialized.name);
        assert_eq!(deserialized.status, ProjectStatus::Active);
    }

    #[test]
    fn test_task_serialization_roundtrip() {
        let task = Task::new(
            "pxt-test".to_string(),
            "pxp-test".to_string(),
            "Write docs".to_string(),
        );
        let json = serde_json::to_string(&task).unwrap();
        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task.id, deserialized.id);
        assert_eq!(task.project_id, deserialized.project_id);
        assert_eq!(deserialized.status, TaskStatus::Pending);
    }

    #[test]
    fn test_task_status_serialization() {
        let status = TaskStatus::InProgress;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#""in_progress""#);
    }

    #[test]
    fn test_project_status_from_str() {
        assert_eq!(
            "on-hold".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::OnHold
        );
        assert_eq!(
            "active".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Active
        );
        assert!("sideways".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent-ish".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_default_scores() {
        let json = r#"{"id":"pxt-1","project_id":"pxp-1","name":"T","created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        // serde(default) for u8 is 0; Task::new() seeds 5 at creation
        assert_eq!(task.impact_score, 0);
        assert_eq!(task.roi_score, 0.0);
        assert!(task.blockers.is_empty());
    }

    #[test]
    fn test_project_progress_calculation() {
        let progress = ProjectProgress::new(0, 0);
        assert_eq!(progress.percentage, 0.0);

        let progress = ProjectProgress::new(5, 3);
        assert_eq!(progress.percentage, 60.0);

        let progress = ProjectProgress::new(4, 4);
        assert_eq!(progress.percentage, 100.0);
    }

    #[test]
    fn test_task_log_serialization() {
        let log = TaskLog::new(
            "pxl-test".to_string(),
            "pxt-test".to_string(),
            TaskAction::Created,
            Some("initial".to_string()),
        );
        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains(r#""action":"created""#));
        let deserialized: TaskLog = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.action, TaskAction::Created);
    }

    #[test]
    fn test_battle_plan_defaults() {
        let json = r#"{"id":"pxb-1","name":"Q3","created_at":"2026-01-01T00:00:00Z","updated_at":"2026-01-01T00:00:00Z"}"#;
        let plan: BattlePlan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.plan_type, "sprint");
        assert!(plan.objectives.is_empty());
        assert_eq!(plan.metrics.progress_percentage, 0.0);
    }

    #[test]
    fn test_template_serialization_roundtrip() {
        let mut template = Template::new(
            "pxm-test".to_string(),
            "Refactor prompt".to_string(),
            "Refactor {{file}} for {{goal}}".to_string(),
        );
        template.variables.push(TemplateVariable {
            name: "file".to_string(),
            var_type: VariableType::Text,
            required: true,
            options: Vec::new(),
        });
        let json = serde_json::to_string(&template).unwrap();
        let deserialized: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.variables.len(), 1);
        assert_eq!(deserialized.usage_count, 0);
    }

    #[test]
    fn test_eval_target_from_str() {
        assert_eq!("task".parse::<EvalTarget>().unwrap(), EvalTarget::Task);
        assert_eq!(
            "Project".parse::<EvalTarget>().unwrap(),
            EvalTarget::Project
        );
        assert!("plan".parse::<EvalTarget>().is_err());
    }
}
