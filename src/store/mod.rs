//! The application-state store for PEX-OS.
//!
//! `Store` owns every collection in memory and is passed by reference into
//! command handlers; there is no global singleton. All mutations are
//! synchronous methods returning `Result`, and operating on a missing id is
//! a checked `Error::NotFound` rather than a silent no-op. Callers persist
//! with `save()` after a successful mutation.
//!
//! Project task counts are never stored; `project_progress` derives them
//! from the task collection so they cannot drift.

pub mod persist;

pub use persist::{PersistedState, STATE_FILE, STATE_VERSION};

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::roi;
use crate::models::rules::{Rule, RuleMatch};
use crate::models::{
    BattlePlan, EvalTarget, Evaluation, GeneratedKey, Insight, Objective, PivotTrigger,
    PlanMetrics, Priority, Project, ProjectProgress, ProjectStatus, Task, TaskAction, TaskLog,
    TaskStatus, Template, TemplateVariable, VariableType, YoutubeRef,
};
use crate::{Error, Result};

/// Entity id prefixes.
pub const PROJECT_PREFIX: &str = "pxp";
pub const TASK_PREFIX: &str = "pxt";
pub const PLAN_PREFIX: &str = "pxb";
pub const TEMPLATE_PREFIX: &str = "pxm";
pub const REF_PREFIX: &str = "pxr";
pub const KEY_PREFIX: &str = "pxk";
pub const INSIGHT_PREFIX: &str = "pxi";
pub const LOG_PREFIX: &str = "pxl";

/// Generate a unique ID for an entity.
///
/// Format: `<prefix>-<4 hex chars>`, hashed from the seed and the current
/// nanosecond timestamp.
pub fn generate_id(prefix: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(
        chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0)
            .to_le_bytes(),
    );
    let hash = hasher.finalize();
    let hash_hex = format!("{:x}", hash);
    format!("{}-{}", prefix, &hash_hex[..4])
}

/// Validate that an ID matches the expected format.
pub fn validate_id(id: &str, prefix: &str) -> Result<()> {
    if !id.starts_with(&format!("{}-", prefix)) {
        return Err(Error::InvalidId(format!(
            "ID must start with '{}-', got: {}",
            prefix, id
        )));
    }
    Ok(())
}

/// Partial update for a project.
#[derive(Debug, Default, Clone)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub impact_score: Option<u8>,
    pub owner: Option<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

/// Partial update for a task.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub impact_score: Option<u8>,
    pub effort_score: Option<u8>,
    pub estimated_minutes: Option<u32>,
    pub actual_minutes: Option<u32>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
    pub add_dependencies: Vec<String>,
}

/// Partial update for a battle plan.
#[derive(Debug, Default, Clone)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub plan_type: Option<String>,
    pub status: Option<ProjectStatus>,
}

/// Partial update for a template.
#[derive(Debug, Default, Clone)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
}

/// Partial update for a youtube reference.
#[derive(Debug, Default, Clone)]
pub struct RefPatch {
    pub title: Option<String>,
    pub channel: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub add_tags: Vec<String>,
}

/// The in-memory store plus its data-directory root.
pub struct Store {
    root: PathBuf,
    state: PersistedState,
    /// Session-transient evaluations; never persisted (see persist.rs).
    evaluations: Vec<Evaluation>,
}

impl Store {
    /// Open the store at the resolved data directory.
    pub fn open() -> Result<Self> {
        let root = persist::resolve_data_dir()?;
        Self::open_at(&root)
    }

    /// Open the store at an explicit data directory.
    pub fn open_at(dir: &Path) -> Result<Self> {
        let state = persist::load(dir)?;
        Ok(Self {
            root: dir.to_path_buf(),
            state,
            evaluations: Vec::new(),
        })
    }

    /// Persist the whitelisted state to disk.
    pub fn save(&self) -> Result<()> {
        persist::save(&self.root, &self.state)
    }

    /// Data directory backing this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reset the store to defaults, discarding all data.
    pub fn clear(&mut self) -> Result<()> {
        self.state = PersistedState::default();
        self.evaluations.clear();
        self.save()
    }

    // === Projects ===

    /// Add a new project; computes its ROI score and returns the id.
    ///
    /// The 4-hex id suffix can collide; a taken id is regenerated so two
    /// entities never share one.
    pub fn add_project(&mut self, mut project: Project) -> Result<String> {
        while self.state.projects.iter().any(|p| p.id == project.id) {
            project.id = generate_id(PROJECT_PREFIX, &project.name);
        }
        project.roi_score = roi::score(project.impact_score as f64, 5.0).roi;
        let id = project.id.clone();
        self.state.projects.insert(0, project);
        Ok(id)
    }

    /// Get a project by ID.
    pub fn get_project(&self, id: &str) -> Result<&Project> {
        self.state
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))
    }

    fn get_project_mut(&mut self, id: &str) -> Result<&mut Project> {
        self.state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))
    }

    /// List projects, optionally filtered by status and tag.
    pub fn list_projects(
        &self,
        status: Option<ProjectStatus>,
        tag: Option<&str>,
    ) -> Vec<&Project> {
        self.state
            .projects
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| tag.map_or(true, |t| p.tags.iter().any(|pt| pt == t)))
            .collect()
    }

    /// Apply a partial update to a project.
    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> Result<Project> {
        let project = self.get_project_mut(id)?;

        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(status) = patch.status {
            project.status = status;
        }
        if let Some(priority) = patch.priority {
            project.priority = priority;
        }
        if let Some(impact) = patch.impact_score {
            project.impact_score = impact;
            project.roi_score = roi::score(impact as f64, 5.0).roi;
        }
        if let Some(owner) = patch.owner {
            project.owner = Some(owner);
        }
        for tag in patch.add_tags {
            if !project.tags.contains(&tag) {
                project.tags.push(tag);
            }
        }
        project.tags.retain(|t| !patch.remove_tags.contains(t));
        project.updated_at = Utc::now();

        Ok(project.clone())
    }

    /// Delete a project and cascade-delete its tasks.
    ///
    /// Task logs are append-only and survive the cascade.
    pub fn delete_project(&mut self, id: &str) -> Result<usize> {
        self.get_project(id)?;
        let before = self.state.tasks.len();
        self.state.tasks.retain(|t| t.project_id != id);
        let cascaded = before - self.state.tasks.len();
        self.state.projects.retain(|p| p.id != id);
        Ok(cascaded)
    }

    /// Derive task counts for a project from the task collection.
    pub fn project_progress(&self, id: &str) -> Result<ProjectProgress> {
        self.get_project(id)?;
        let tasks_count = self
            .state
            .tasks
            .iter()
            .filter(|t| t.project_id == id)
            .count();
        let completed = self
            .state
            .tasks
            .iter()
            .filter(|t| t.project_id == id && t.status == TaskStatus::Completed)
            .count();
        Ok(ProjectProgress::new(tasks_count, completed))
    }

    // === Tasks ===

    /// Add a new task. The owning project must exist. Computes the ROI
    /// score, prepends to the task list, and appends a `created` log.
    pub fn add_task(&mut self, mut task: Task) -> Result<String> {
        self.get_project(&task.project_id)?;
        while self.state.tasks.iter().any(|t| t.id == task.id) {
            task.id = generate_id(TASK_PREFIX, &task.name);
        }

        task.roi_score = roi::score(task.impact_score as f64, task.effort_score as f64).roi;
        let id = task.id.clone();
        self.state.tasks.insert(0, task);
        self.append_log(&id, TaskAction::Created, None);
        Ok(id)
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<&Task> {
        self.state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))
    }

    fn get_task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Task not found: {}", id)))
    }

    /// List tasks, optionally filtered.
    pub fn list_tasks(
        &self,
        project_id: Option<&str>,
        status: Option<TaskStatus>,
        priority: Option<Priority>,
        tag: Option<&str>,
    ) -> Vec<&Task> {
        self.state
            .tasks
            .iter()
            .filter(|t| project_id.map_or(true, |p| t.project_id == p))
            .filter(|t| status.map_or(true, |s| t.status == s))
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .filter(|t| tag.map_or(true, |tg| t.tags.iter().any(|tt| tt == tg)))
            .collect()
    }

    /// Apply a partial update to a task, recomputing the ROI score from the
    /// patched impact/effort falling back to stored values.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        let task = self.get_task_mut(id)?;

        if let Some(name) = patch.name {
            task.name = name;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(impact) = patch.impact_score {
            task.impact_score = impact;
        }
        if let Some(effort) = patch.effort_score {
            task.effort_score = effort;
        }
        if let Some(minutes) = patch.estimated_minutes {
            task.estimated_minutes = Some(minutes);
        }
        if let Some(minutes) = patch.actual_minutes {
            task.actual_minutes = Some(minutes);
        }
        for tag in patch.add_tags {
            if !task.tags.contains(&tag) {
                task.tags.push(tag);
            }
        }
        task.tags.retain(|t| !patch.remove_tags.contains(t));
        for dep in patch.add_dependencies {
            if !task.dependencies.contains(&dep) {
                task.dependencies.push(dep);
            }
        }

        task.roi_score = roi::score(task.impact_score as f64, task.effort_score as f64).roi;
        task.updated_at = Utc::now();
        let updated = task.clone();

        self.append_log(id, TaskAction::Updated, None);
        Ok(updated)
    }

    /// Start a task: pending or blocked -> in_progress.
    pub fn start_task(&mut self, id: &str) -> Result<Task> {
        let task = self.get_task_mut(id)?;
        match task.status {
            TaskStatus::Pending | TaskStatus::Blocked => {}
            TaskStatus::InProgress => {
                return Err(Error::InvalidInput(format!("Task already started: {}", id)))
            }
            TaskStatus::Completed => return Err(Error::AlreadyCompleted(id.to_string())),
            TaskStatus::Cancelled => {
                return Err(Error::InvalidInput(format!("Task is cancelled: {}", id)))
            }
        }

        let now = Utc::now();
        task.status = TaskStatus::InProgress;
        task.started_at = Some(now);
        task.updated_at = now;
        let updated = task.clone();

        self.append_log(id, TaskAction::Started, None);
        Ok(updated)
    }

    /// Complete a task. Double completion is rejected; corrections to
    /// `actual_minutes` go through `update_task`.
    pub fn complete_task(&mut self, id: &str, actual_minutes: Option<u32>) -> Result<Task> {
        let task = self.get_task_mut(id)?;
        match task.status {
            TaskStatus::Completed => return Err(Error::AlreadyCompleted(id.to_string())),
            TaskStatus::Cancelled => {
                return Err(Error::InvalidInput(format!("Task is cancelled: {}", id)))
            }
            _ => {}
        }

        let now = Utc::now();
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);
        task.updated_at = now;
        if let Some(minutes) = actual_minutes {
            task.actual_minutes = Some(minutes);
        }
        let updated = task.clone();

        self.append_log(id, TaskAction::Completed, None);
        Ok(updated)
    }

    /// Block a task, recording the blocker. Blockers accumulate; nothing
    /// ever clears the list.
    pub fn block_task(&mut self, id: &str, reason: String) -> Result<Task> {
        let task = self.get_task_mut(id)?;
        match task.status {
            TaskStatus::Completed => return Err(Error::AlreadyCompleted(id.to_string())),
            TaskStatus::Cancelled => {
                return Err(Error::InvalidInput(format!("Task is cancelled: {}", id)))
            }
            _ => {}
        }

        task.status = TaskStatus::Blocked;
        task.blockers.push(reason.clone());
        task.updated_at = Utc::now();
        let updated = task.clone();

        self.append_log(id, TaskAction::Blocked, Some(reason));
        Ok(updated)
    }

    /// Cancel a task.
    pub fn cancel_task(&mut self, id: &str, note: Option<String>) -> Result<Task> {
        let task = self.get_task_mut(id)?;
        match task.status {
            TaskStatus::Completed => return Err(Error::AlreadyCompleted(id.to_string())),
            TaskStatus::Cancelled => {
                return Err(Error::InvalidInput(format!(
                    "Task already cancelled: {}",
                    id
                )))
            }
            _ => {}
        }

        task.status = TaskStatus::Cancelled;
        task.updated_at = Utc::now();
        let updated = task.clone();

        self.append_log(id, TaskAction::Cancelled, note);
        Ok(updated)
    }

    /// Delete a task. Derived project counts adjust automatically; logs are
    /// append-only and stay.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        self.get_task(id)?;
        self.state.tasks.retain(|t| t.id != id);
        Ok(())
    }

    fn append_log(&mut self, task_id: &str, action: TaskAction, note: Option<String>) {
        let mut id = generate_id(LOG_PREFIX, task_id);
        while self.state.task_logs.iter().any(|l| l.id == id) {
            id = generate_id(LOG_PREFIX, task_id);
        }
        self.state
            .task_logs
            .push(TaskLog::new(id, task_id.to_string(), action, note));
    }

    /// List task logs, optionally filtered by task, newest first.
    pub fn list_logs(&self, task_id: Option<&str>) -> Vec<&TaskLog> {
        let mut logs: Vec<&TaskLog> = self
            .state
            .task_logs
            .iter()
            .filter(|l| task_id.map_or(true, |t| l.task_id == t))
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }

    // === Evaluations ===

    /// Evaluate a task or project: compute its ROI verdict and keep exactly
    /// one evaluation per target id (the newest).
    pub fn evaluate_item(&mut self, id: &str, target: EvalTarget) -> Result<Evaluation> {
        let (name, impact, effort) = match target {
            EvalTarget::Task => {
                let task = self.get_task(id)?;
                (
                    task.name.clone(),
                    task.impact_score as f64,
                    task.effort_score as f64,
                )
            }
            // Projects carry no effort score; 5 is the neutral default.
            EvalTarget::Project => {
                let project = self.get_project(id)?;
                (project.name.clone(), project.impact_score as f64, 5.0)
            }
        };

        let verdict = roi::score(impact, effort);
        let evaluation = Evaluation {
            target_id: id.to_string(),
            target_type: target,
            roi: verdict.roi,
            recommendation: verdict.recommendation,
            priority: verdict.priority,
            reasoning: format!(
                "{} '{}' scores ROI {:.1} (impact {}, effort {}): {}",
                target, name, verdict.roi, impact, effort, verdict.recommendation
            ),
            flagged_for_removal: verdict.roi < 1.0,
            evaluated_at: Utc::now(),
        };

        // Evict any prior evaluation for the same target
        self.evaluations.retain(|e| e.target_id != id);
        self.evaluations.insert(0, evaluation.clone());
        Ok(evaluation)
    }

    /// Session-transient evaluations, newest first.
    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    // === Access keys ===

    /// Generate an access key for a user. No uniqueness check, no expiry.
    pub fn generate_key(&mut self, user_name: String) -> GeneratedKey {
        let mut id = generate_id(KEY_PREFIX, &user_name);
        while self.state.keys.iter().any(|k| k.id == id) {
            id = generate_id(KEY_PREFIX, &user_name);
        }
        let key = GeneratedKey {
            id,
            key: format!("pex-{}", uuid::Uuid::new_v4().simple()),
            user_name,
            active: true,
            created_at: Utc::now(),
        };
        self.state.keys.insert(0, key.clone());
        key
    }

    /// Revoke a key by flipping `active` to false. The record stays.
    pub fn revoke_key(&mut self, id: &str) -> Result<GeneratedKey> {
        let key = self
            .state
            .keys
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| Error::NotFound(format!("Key not found: {}", id)))?;
        key.active = false;
        Ok(key.clone())
    }

    /// List keys, optionally filtering to active ones.
    pub fn list_keys(&self, active_only: bool) -> Vec<&GeneratedKey> {
        self.state
            .keys
            .iter()
            .filter(|k| !active_only || k.active)
            .collect()
    }

    // === Battle plans ===

    /// Add a new battle plan.
    pub fn add_plan(&mut self, mut plan: BattlePlan) -> Result<String> {
        while self.state.battle_plans.iter().any(|p| p.id == plan.id) {
            plan.id = generate_id(PLAN_PREFIX, &plan.name);
        }
        let id = plan.id.clone();
        self.state.battle_plans.insert(0, plan);
        Ok(id)
    }

    /// Get a battle plan by ID.
    pub fn get_plan(&self, id: &str) -> Result<&BattlePlan> {
        self.state
            .battle_plans
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Battle plan not found: {}", id)))
    }

    fn get_plan_mut(&mut self, id: &str) -> Result<&mut BattlePlan> {
        self.state
            .battle_plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Battle plan not found: {}", id)))
    }

    /// List battle plans.
    pub fn list_plans(&self, status: Option<ProjectStatus>) -> Vec<&BattlePlan> {
        self.state
            .battle_plans
            .iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .collect()
    }

    /// Apply a partial update to a battle plan.
    pub fn update_plan(&mut self, id: &str, patch: PlanPatch) -> Result<BattlePlan> {
        let plan = self.get_plan_mut(id)?;
        if let Some(name) = patch.name {
            plan.name = name;
        }
        if let Some(plan_type) = patch.plan_type {
            plan.plan_type = plan_type;
        }
        if let Some(status) = patch.status {
            plan.status = status;
        }
        plan.updated_at = Utc::now();
        Ok(plan.clone())
    }

    /// Delete a battle plan.
    pub fn delete_plan(&mut self, id: &str) -> Result<()> {
        self.get_plan(id)?;
        self.state.battle_plans.retain(|p| p.id != id);
        Ok(())
    }

    /// Add an objective to a plan; returns the objective id.
    pub fn add_objective(
        &mut self,
        plan_id: &str,
        description: String,
        priority: Priority,
        completion_criteria: Option<String>,
    ) -> Result<String> {
        let plan = self.get_plan_mut(plan_id)?;
        let obj_id = format!("obj-{}", plan.objectives.len() + 1);
        plan.objectives.push(Objective {
            id: obj_id.clone(),
            description,
            priority,
            status: TaskStatus::Pending,
            linked_tasks: Vec::new(),
            completion_criteria,
            blockers: Vec::new(),
        });
        plan.updated_at = Utc::now();
        Ok(obj_id)
    }

    /// Set the status of an objective inside a plan.
    pub fn set_objective_status(
        &mut self,
        plan_id: &str,
        objective_id: &str,
        status: TaskStatus,
    ) -> Result<()> {
        let plan = self.get_plan_mut(plan_id)?;
        let objective = plan
            .objectives
            .iter_mut()
            .find(|o| o.id == objective_id)
            .ok_or_else(|| Error::NotFound(format!("Objective not found: {}", objective_id)))?;
        objective.status = status;
        plan.updated_at = Utc::now();
        Ok(())
    }

    /// Link a task to an objective.
    pub fn link_task_to_objective(
        &mut self,
        plan_id: &str,
        objective_id: &str,
        task_id: &str,
    ) -> Result<()> {
        self.get_task(task_id)?;
        let plan = self.get_plan_mut(plan_id)?;
        let objective = plan
            .objectives
            .iter_mut()
            .find(|o| o.id == objective_id)
            .ok_or_else(|| Error::NotFound(format!("Objective not found: {}", objective_id)))?;
        if !objective.linked_tasks.iter().any(|t| t == task_id) {
            objective.linked_tasks.push(task_id.to_string());
        }
        plan.updated_at = Utc::now();
        Ok(())
    }

    /// Add a pivot trigger to a plan; returns its index.
    pub fn add_pivot_trigger(
        &mut self,
        plan_id: &str,
        condition: String,
        action: String,
    ) -> Result<usize> {
        let plan = self.get_plan_mut(plan_id)?;
        plan.pivot_triggers.push(PivotTrigger {
            condition,
            action,
            triggered: false,
        });
        plan.updated_at = Utc::now();
        Ok(plan.pivot_triggers.len() - 1)
    }

    /// Mark a pivot trigger as fired.
    pub fn mark_trigger_fired(&mut self, plan_id: &str, index: usize) -> Result<()> {
        let plan = self.get_plan_mut(plan_id)?;
        let trigger = plan.pivot_triggers.get_mut(index).ok_or_else(|| {
            Error::NotFound(format!("Pivot trigger {} not found on {}", index, plan_id))
        })?;
        trigger.triggered = true;
        plan.updated_at = Utc::now();
        Ok(())
    }

    /// Record an externally supplied metrics snapshot. Nothing is derived
    /// from objectives here.
    pub fn set_plan_metrics(&mut self, plan_id: &str, metrics: PlanMetrics) -> Result<()> {
        let plan = self.get_plan_mut(plan_id)?;
        plan.metrics = metrics;
        plan.updated_at = Utc::now();
        Ok(())
    }

    // === Templates ===

    /// Add a new template.
    pub fn add_template(&mut self, mut template: Template) -> Result<String> {
        while self.state.templates.iter().any(|t| t.id == template.id) {
            template.id = generate_id(TEMPLATE_PREFIX, &template.name);
        }
        let id = template.id.clone();
        self.state.templates.insert(0, template);
        Ok(id)
    }

    /// Get a template by ID.
    pub fn get_template(&self, id: &str) -> Result<&Template> {
        self.state
            .templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Template not found: {}", id)))
    }

    fn get_template_mut(&mut self, id: &str) -> Result<&mut Template> {
        self.state
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Template not found: {}", id)))
    }

    /// List templates, optionally filtered by category.
    pub fn list_templates(&self, category: Option<&str>) -> Vec<&Template> {
        self.state
            .templates
            .iter()
            .filter(|t| category.map_or(true, |c| t.category.as_deref() == Some(c)))
            .collect()
    }

    /// Apply a partial update to a template.
    pub fn update_template(&mut self, id: &str, patch: TemplatePatch) -> Result<Template> {
        let template = self.get_template_mut(id)?;
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(category) = patch.category {
            template.category = Some(category);
        }
        if let Some(content) = patch.content {
            template.content = content;
        }
        template.updated_at = Utc::now();
        Ok(template.clone())
    }

    /// Declare a variable on a template.
    pub fn add_template_variable(&mut self, id: &str, variable: TemplateVariable) -> Result<()> {
        let template = self.get_template_mut(id)?;
        if template.variables.iter().any(|v| v.name == variable.name) {
            return Err(Error::InvalidInput(format!(
                "Variable already declared: {}",
                variable.name
            )));
        }
        template.variables.push(variable);
        template.updated_at = Utc::now();
        Ok(())
    }

    /// Delete a template.
    pub fn delete_template(&mut self, id: &str) -> Result<()> {
        self.get_template(id)?;
        self.state.templates.retain(|t| t.id != id);
        Ok(())
    }

    /// Record a use of a template.
    pub fn use_template(&mut self, id: &str) -> Result<u32> {
        let template = self.get_template_mut(id)?;
        template.usage_count += 1;
        template.updated_at = Utc::now();
        Ok(template.usage_count)
    }

    /// Rate a template (running average).
    pub fn rate_template(&mut self, id: &str, rating: f64) -> Result<f64> {
        if !(0.0..=5.0).contains(&rating) {
            return Err(Error::InvalidInput(format!(
                "Rating must be between 0 and 5, got {}",
                rating
            )));
        }
        let template = self.get_template_mut(id)?;
        let total = template.avg_rating * template.ratings_count as f64 + rating;
        template.ratings_count += 1;
        template.avg_rating = total / template.ratings_count as f64;
        template.updated_at = Utc::now();
        Ok(template.avg_rating)
    }

    /// Render a template by substituting `{{name}}` placeholders.
    ///
    /// Missing required variables and select values outside the declared
    /// options are errors. Placeholders for undeclared names are left
    /// intact. Rendering counts as a use.
    pub fn render_template(
        &mut self,
        id: &str,
        values: &BTreeMap<String, String>,
    ) -> Result<String> {
        let template = self.get_template(id)?;

        for variable in &template.variables {
            match values.get(&variable.name) {
                Some(value) => {
                    if variable.var_type == VariableType::Select
                        && !variable.options.iter().any(|o| o == value)
                    {
                        return Err(Error::InvalidInput(format!(
                            "Value '{}' not in options for variable '{}'",
                            value, variable.name
                        )));
                    }
                }
                None if variable.required => {
                    return Err(Error::InvalidInput(format!(
                        "Missing required variable: {}",
                        variable.name
                    )));
                }
                None => {}
            }
        }

        let mut rendered = template.content.clone();
        for variable in &template.variables {
            if let Some(value) = values.get(&variable.name) {
                rendered = rendered.replace(&format!("{{{{{}}}}}", variable.name), value);
            }
        }

        self.use_template(id)?;
        Ok(rendered)
    }

    // === Youtube refs ===

    /// Add a new reference.
    pub fn add_ref(&mut self, mut youtube_ref: YoutubeRef) -> Result<String> {
        while self.state.youtube_refs.iter().any(|r| r.id == youtube_ref.id) {
            youtube_ref.id = generate_id(REF_PREFIX, &youtube_ref.title);
        }
        let id = youtube_ref.id.clone();
        self.state.youtube_refs.insert(0, youtube_ref);
        Ok(id)
    }

    /// Get a reference by ID.
    pub fn get_ref(&self, id: &str) -> Result<&YoutubeRef> {
        self.state
            .youtube_refs
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Reference not found: {}", id)))
    }

    /// List references, optionally filtered.
    pub fn list_refs(&self, category: Option<&str>, unwatched_only: bool) -> Vec<&YoutubeRef> {
        self.state
            .youtube_refs
            .iter()
            .filter(|r| category.map_or(true, |c| r.category.as_deref() == Some(c)))
            .filter(|r| !unwatched_only || !r.watched)
            .collect()
    }

    /// Apply a partial update to a reference.
    pub fn update_ref(&mut self, id: &str, patch: RefPatch) -> Result<YoutubeRef> {
        let youtube_ref = self
            .state
            .youtube_refs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Reference not found: {}", id)))?;
        if let Some(title) = patch.title {
            youtube_ref.title = title;
        }
        if let Some(channel) = patch.channel {
            youtube_ref.channel = Some(channel);
        }
        if let Some(category) = patch.category {
            youtube_ref.category = Some(category);
        }
        if let Some(notes) = patch.notes {
            youtube_ref.notes = Some(notes);
        }
        for tag in patch.add_tags {
            if !youtube_ref.tags.contains(&tag) {
                youtube_ref.tags.push(tag);
            }
        }
        youtube_ref.updated_at = Utc::now();
        Ok(youtube_ref.clone())
    }

    /// Mark a reference watched.
    pub fn mark_watched(&mut self, id: &str) -> Result<YoutubeRef> {
        let youtube_ref = self
            .state
            .youtube_refs
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Reference not found: {}", id)))?;
        youtube_ref.watched = true;
        youtube_ref.updated_at = Utc::now();
        Ok(youtube_ref.clone())
    }

    /// Delete a reference.
    pub fn delete_ref(&mut self, id: &str) -> Result<()> {
        self.get_ref(id)?;
        self.state.youtube_refs.retain(|r| r.id != id);
        Ok(())
    }

    // === Rules and insights ===

    /// The rule table.
    pub fn rules(&self) -> &[Rule] {
        &self.state.rules
    }

    /// Toggle a rule's enabled flag; returns the updated rule.
    pub fn toggle_rule(&mut self, id: &str) -> Result<Rule> {
        let rule = self
            .state
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("Rule not found: {}", id)))?;
        rule.enabled = !rule.enabled;
        Ok(rule.clone())
    }

    /// Run all enabled rules against the task list, synthesizing one
    /// insight per match and bumping trigger counts.
    pub fn run_rules(&mut self) -> Vec<RuleMatch> {
        let now = Utc::now();
        let matches = crate::models::rules::run(&self.state.rules, &self.state.tasks, now);

        for m in &matches {
            if let Some(rule) = self.state.rules.iter_mut().find(|r| r.id == m.rule_id) {
                rule.trigger_count += 1;
            }
            let mut id = generate_id(INSIGHT_PREFIX, &format!("{}{}", m.rule_id, m.task_id));
            while self.state.insights.iter().any(|i| i.id == id) {
                id = generate_id(INSIGHT_PREFIX, &m.task_id);
            }
            let insight = Insight {
                id,
                title: format!("{}: {}", m.rule_name, m.task_name),
                body: format!("{}. {}", m.reason, m.action),
                category: m.rule_id.clone(),
                rule_id: Some(m.rule_id.clone()),
                created_at: now,
            };
            self.state.insights.insert(0, insight);
        }

        matches
    }

    /// List insights, newest first, optionally filtered by category.
    pub fn list_insights(&self, category: Option<&str>) -> Vec<&Insight> {
        self.state
            .insights
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .collect()
    }

    /// Drop all insights. The only retention tool for this collection.
    pub fn clear_insights(&mut self) -> usize {
        let count = self.state.insights.len();
        self.state.insights.clear();
        count
    }

    // === Settings ===

    /// Get a setting value.
    pub fn get_setting(&self, key: &str) -> Option<&str> {
        self.state.settings.get(key).map(String::as_str)
    }

    /// Set a setting value.
    pub fn set_setting(&mut self, key: String, value: String) {
        self.state.settings.insert(key, value);
    }

    /// All settings in key order.
    pub fn settings(&self) -> &BTreeMap<String, String> {
        &self.state.settings
    }

    // === Summary ===

    /// Counts for the status summary shown by bare `px`.
    pub fn summary_counts(&self) -> SummaryCounts {
        SummaryCounts {
            projects: self.state.projects.len(),
            active_projects: self
                .state
                .projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Active)
                .count(),
            tasks: self.state.tasks.len(),
            pending_tasks: self
                .state
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Pending)
                .count(),
            blocked_tasks: self
                .state
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Blocked)
                .count(),
            plans: self.state.battle_plans.len(),
            templates: self.state.templates.len(),
            insights: self.state.insights.len(),
        }
    }

    /// Pending tasks sorted by ROI descending: the next best things to do.
    pub fn ready_tasks(&self) -> Vec<&Task> {
        let mut ready: Vec<&Task> = self
            .state
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .filter(|t| {
                t.dependencies.iter().all(|dep| {
                    self.get_task(dep)
                        .map(|d| d.status == TaskStatus::Completed)
                        .unwrap_or(true)
                })
            })
            .collect();
        ready.sort_by(|a, b| {
            b.roi_score
                .partial_cmp(&a.roi_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ready
    }
}

/// Collection counts for the default status summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SummaryCounts {
    pub projects: usize,
    pub active_projects: usize,
    pub tasks: usize,
    pub pending_tasks: usize,
    pub blocked_tasks: usize,
    pub plans: usize,
    pub templates: usize,
    pub insights: usize,
}
