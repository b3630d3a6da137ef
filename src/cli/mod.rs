//! CLI argument definitions for px.

use clap::{Parser, Subcommand};

use crate::models::{EvalTarget, Priority, ProjectStatus, TaskStatus, VariableType};

/// px - a personal command center for projects, tasks, and plans.
///
/// Run bare `px` for a status summary, then `px task list` to find work.
#[derive(Parser, Debug)]
#[command(name = "px")]
#[command(author, version, about = "A CLI command center for ROI-driven project and task tracking", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Data directory holding state.json.
    /// Can also be set via the PX_DATA_DIR environment variable.
    #[arg(short = 'D', long = "data-dir", global = true, env = "PX_DATA_DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Project management commands
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Battle plan commands (objectives, pivot triggers, metrics)
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },

    /// Prompt template commands
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },

    /// Reference video commands
    Ref {
        #[command(subcommand)]
        command: RefCommands,
    },

    /// Access key commands
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Productivity rule commands
    Rule {
        #[command(subcommand)]
        command: RuleCommands,
    },

    /// Insight commands
    Insight {
        #[command(subcommand)]
        command: InsightCommands,
    },

    /// Score a task or project and get a keep/kill recommendation
    Evaluate {
        /// Entity ID (e.g., pxt-a1b2 or pxp-a1b2)
        id: String,

        /// Whether the ID names a task or a project
        #[arg(long, default_value = "task")]
        target: EvalTarget,
    },

    /// Show the task audit trail
    Log {
        /// Optional task ID to filter entries
        task_id: Option<String>,

        /// Maximum number of entries to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// System administration commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

/// Project management commands
#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a new project
    Add {
        /// Project name
        name: String,

        /// Detailed description
        #[arg(long)]
        description: Option<String>,

        /// Priority (critical, high, medium, low)
        #[arg(long)]
        priority: Option<Priority>,

        /// Impact score (0-10)
        #[arg(long)]
        impact: Option<u8>,

        /// Owner name
        #[arg(long)]
        owner: Option<String>,

        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Show a project with derived task counts
    Show {
        /// Project ID (e.g., pxp-a1b2)
        id: String,
    },

    /// List projects
    List {
        /// Filter by status (active, archived, completed, on_hold)
        #[arg(long)]
        status: Option<ProjectStatus>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Update a project
    Update {
        /// Project ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        status: Option<ProjectStatus>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Impact score (0-10); recomputes the ROI score
        #[arg(long)]
        impact: Option<u8>,

        #[arg(long)]
        owner: Option<String>,

        /// Tags to add (repeatable)
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,

        /// Tags to remove (repeatable)
        #[arg(long = "remove-tag")]
        remove_tags: Vec<String>,
    },

    /// Delete a project and all its tasks
    Delete {
        /// Project ID
        id: String,
    },
}

/// Task management commands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task under a project
    Add {
        /// Owning project ID
        project_id: String,

        /// Task name
        name: String,

        /// Priority (critical, high, medium, low)
        #[arg(long)]
        priority: Option<Priority>,

        /// Impact score (0-10)
        #[arg(long)]
        impact: Option<u8>,

        /// Effort score (0-10)
        #[arg(long)]
        effort: Option<u8>,

        /// Estimated minutes of work
        #[arg(long)]
        estimate: Option<u32>,

        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Task IDs this task depends on (repeatable)
        #[arg(long = "dep")]
        dependencies: Vec<String>,
    },

    /// Show a task
    Show {
        /// Task ID (e.g., pxt-a1b2)
        id: String,
    },

    /// List tasks
    List {
        /// Filter by owning project
        #[arg(long)]
        project: Option<String>,

        /// Filter by status (pending, in_progress, completed, blocked, cancelled)
        #[arg(long)]
        status: Option<TaskStatus>,

        /// Filter by priority
        #[arg(long)]
        priority: Option<Priority>,

        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Update a task (recomputes the ROI score)
    Update {
        /// Task ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Impact score (0-10)
        #[arg(long)]
        impact: Option<u8>,

        /// Effort score (0-10)
        #[arg(long)]
        effort: Option<u8>,

        /// Estimated minutes
        #[arg(long)]
        estimate: Option<u32>,

        /// Actual minutes (correction workflow after completion)
        #[arg(long)]
        actual: Option<u32>,

        /// Tags to add (repeatable)
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,

        /// Tags to remove (repeatable)
        #[arg(long = "remove-tag")]
        remove_tags: Vec<String>,

        /// Dependencies to add (repeatable)
        #[arg(long = "add-dep")]
        add_deps: Vec<String>,
    },

    /// Start work on a task
    Start {
        /// Task ID
        id: String,
    },

    /// Complete a task (rejected if already completed)
    Complete {
        /// Task ID
        id: String,

        /// Actual minutes spent
        #[arg(long)]
        minutes: Option<u32>,
    },

    /// Block a task, recording the blocker
    Block {
        /// Task ID
        id: String,

        /// What is blocking the task
        reason: String,
    },

    /// Cancel a task
    Cancel {
        /// Task ID
        id: String,

        /// Optional note explaining the cancellation
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

/// Battle plan commands
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// Create a new battle plan
    Add {
        /// Plan name
        name: String,

        /// Plan type (e.g., sprint, quarter, launch)
        #[arg(long = "type")]
        plan_type: Option<String>,
    },

    /// Show a plan with objectives and triggers
    Show {
        /// Plan ID (e.g., pxb-a1b2)
        id: String,
    },

    /// List plans
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<ProjectStatus>,
    },

    /// Update a plan
    Update {
        /// Plan ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type")]
        plan_type: Option<String>,

        #[arg(long)]
        status: Option<ProjectStatus>,
    },

    /// Delete a plan
    Delete {
        /// Plan ID
        id: String,
    },

    /// Add an objective to a plan
    ObjectiveAdd {
        /// Plan ID
        plan_id: String,

        /// What must be achieved
        description: String,

        /// Priority (critical, high, medium, low)
        #[arg(long)]
        priority: Option<Priority>,

        /// How completion is judged
        #[arg(long)]
        criteria: Option<String>,
    },

    /// Set an objective's status
    ObjectiveStatus {
        /// Plan ID
        plan_id: String,

        /// Objective ID (e.g., obj-1)
        objective_id: String,

        /// New status (pending, in_progress, completed, blocked, cancelled)
        status: TaskStatus,
    },

    /// Link a task to an objective
    ObjectiveLink {
        /// Plan ID
        plan_id: String,

        /// Objective ID
        objective_id: String,

        /// Task ID to link
        task_id: String,
    },

    /// Add a pivot trigger to a plan
    PivotAdd {
        /// Plan ID
        plan_id: String,

        /// Condition that fires the trigger
        condition: String,

        /// What to do when it fires
        action: String,
    },

    /// Mark a pivot trigger as fired
    PivotFire {
        /// Plan ID
        plan_id: String,

        /// Trigger index (as shown by `plan show`)
        index: usize,
    },

    /// Record a metrics snapshot for a plan
    Metrics {
        /// Plan ID
        plan_id: String,

        #[arg(long, default_value = "0")]
        objectives_total: u32,

        #[arg(long, default_value = "0")]
        objectives_completed: u32,

        #[arg(long, default_value = "0")]
        blocker_count: u32,

        #[arg(long, default_value = "0")]
        velocity: f64,

        #[arg(long, default_value = "0")]
        progress: f64,
    },
}

/// Prompt template commands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Create a new template
    Add {
        /// Template name
        name: String,

        /// Template body with {{variable}} placeholders
        content: String,

        /// Category for grouping
        #[arg(long)]
        category: Option<String>,
    },

    /// Show a template
    Show {
        /// Template ID (e.g., pxm-a1b2)
        id: String,
    },

    /// List templates
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Update a template
    Update {
        /// Template ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },

    /// Declare a variable on a template
    VarAdd {
        /// Template ID
        id: String,

        /// Placeholder name as it appears inside {{...}}
        name: String,

        /// Variable type (text, number, select)
        #[arg(long = "type", default_value = "text")]
        var_type: VariableType,

        /// Whether a value must be supplied when rendering
        #[arg(long)]
        required: bool,

        /// Allowed values for select-type variables (repeatable)
        #[arg(long = "option")]
        options: Vec<String>,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,
    },

    /// Record a use of a template
    Use {
        /// Template ID
        id: String,
    },

    /// Rate a template (0-5)
    Rate {
        /// Template ID
        id: String,

        /// Rating
        rating: f64,
    },

    /// Render a template with variable values
    Render {
        /// Template ID
        id: String,

        /// Variable values as name=value (repeatable)
        #[arg(long = "var", value_parser = parse_key_value)]
        vars: Vec<(String, String)>,
    },
}

/// Reference video commands
#[derive(Subcommand, Debug)]
pub enum RefCommands {
    /// Save a new reference video
    Add {
        /// Video title
        title: String,

        /// Video URL
        url: String,

        /// Channel name
        #[arg(long)]
        channel: Option<String>,

        /// Category for grouping
        #[arg(long)]
        category: Option<String>,

        /// Tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Show a reference
    Show {
        /// Reference ID (e.g., pxr-a1b2)
        id: String,
    },

    /// List references
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Show only unwatched references
        #[arg(long)]
        unwatched: bool,
    },

    /// Update a reference
    Update {
        /// Reference ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        channel: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Tags to add (repeatable)
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,
    },

    /// Mark a reference as watched
    Watched {
        /// Reference ID
        id: String,
    },

    /// Delete a reference
    Delete {
        /// Reference ID
        id: String,
    },
}

/// Access key commands
#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Generate an access key for a user
    Generate {
        /// Who the key is issued to
        user_name: String,
    },

    /// Revoke a key (the record is kept, marked inactive)
    Revoke {
        /// Key ID (e.g., pxk-a1b2)
        id: String,
    },

    /// List keys
    List {
        /// Show only active keys
        #[arg(long)]
        active: bool,
    },
}

/// Productivity rule commands
#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// List rules and their trigger counts
    List,

    /// Toggle a rule on or off
    Toggle {
        /// Rule ID (e.g., rule-low-roi)
        id: String,
    },

    /// Evaluate enabled rules against live tasks, synthesizing insights
    Run,
}

/// Insight commands
#[derive(Subcommand, Debug)]
pub enum InsightCommands {
    /// List insights, newest first
    List {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete all insights
    Clear,
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to store
        value: String,
    },

    /// List all configuration values
    List,
}

/// System administration commands
#[derive(Subcommand, Debug)]
pub enum SystemCommands {
    /// Show version and build metadata
    BuildInfo,

    /// Print the resolved data directory
    Path,

    /// Delete all data and reset to defaults
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        force: bool,
    },
}

/// Parse a `name=value` pair for template variables.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got: {}", s)),
    }
}
