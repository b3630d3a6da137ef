//! Command implementations for the px CLI.
//!
//! This module contains the business logic for each CLI command, organized
//! by entity type: `project`, `task`, `plan`, `template`, `refs`, `key`,
//! `rule`, `insight`, `evaluate`, `log`, `config`, `system`.
//!
//! Each command takes the open `Store` by reference, performs its mutation,
//! saves, and returns a typed result implementing `CommandResult` so main
//! can render JSON (default) or human-readable text.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::rules::{Rule, RuleMatch};
use crate::models::{
    BattlePlan, EvalTarget, Evaluation, GeneratedKey, Insight, Priority, Project,
    ProjectProgress, ProjectStatus, Task, TaskLog, TaskStatus, Template, TemplateVariable,
    YoutubeRef,
};
use crate::store::{
    self, PlanPatch, ProjectPatch, RefPatch, Store, SummaryCounts, TaskPatch, TemplatePatch,
};
use crate::Result;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json_of<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

// === Status (bare `px`) ===

/// Overview shown when px runs with no subcommand.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub counts: SummaryCounts,
    pub ready: Vec<Task>,
}

impl CommandResult for StatusReport {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "Projects: {} ({} active)\nTasks: {} ({} pending, {} blocked)\nPlans: {}  Templates: {}  Insights: {}\n",
            self.counts.projects,
            self.counts.active_projects,
            self.counts.tasks,
            self.counts.pending_tasks,
            self.counts.blocked_tasks,
            self.counts.plans,
            self.counts.templates,
            self.counts.insights,
        );
        if self.ready.is_empty() {
            out.push_str("\nNo ready tasks.");
        } else {
            out.push_str("\nReady (by ROI):\n");
            for task in &self.ready {
                out.push_str(&format!(
                    "  {} [roi {:.1}] {}\n",
                    task.id, task.roi_score, task.name
                ));
            }
        }
        out
    }
}

/// Build the status summary: collection counts plus ready work by ROI.
pub fn status(store: &Store) -> Result<StatusReport> {
    Ok(StatusReport {
        counts: store.summary_counts(),
        ready: store.ready_tasks().into_iter().take(5).cloned().collect(),
    })
}

// === Projects ===

/// A project together with its derived progress.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub progress: ProjectProgress,
}

impl CommandResult for ProjectDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "{} {} [{}] priority {} impact {} roi {:.1}\n  tasks: {}/{} completed ({:.0}%)",
            self.project.id,
            self.project.name,
            self.project.status,
            self.project.priority,
            self.project.impact_score,
            self.project.roi_score,
            self.progress.completed_tasks_count,
            self.progress.tasks_count,
            self.progress.percentage,
        )
    }
}

/// A list of projects with derived progress.
#[derive(Debug, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectDetail>,
}

impl CommandResult for ProjectList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.projects.is_empty() {
            return "No projects.".to_string();
        }
        self.projects
            .iter()
            .map(|p| p.to_human())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Confirmation of a project deletion and its task cascade.
#[derive(Debug, Serialize)]
pub struct ProjectDeleted {
    pub id: String,
    pub cascaded_tasks: usize,
}

impl CommandResult for ProjectDeleted {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Deleted project {} ({} task(s) removed)",
            self.id, self.cascaded_tasks
        )
    }
}

pub fn project_add(
    store: &mut Store,
    name: String,
    description: Option<String>,
    priority: Option<Priority>,
    impact: Option<u8>,
    owner: Option<String>,
    tags: Vec<String>,
) -> Result<ProjectDetail> {
    let mut project = Project::new(store::generate_id(store::PROJECT_PREFIX, &name), name);
    project.description = description;
    if let Some(priority) = priority {
        project.priority = priority;
    }
    if let Some(impact) = impact {
        project.impact_score = impact;
    }
    project.owner = owner;
    project.tags = tags;

    let id = store.add_project(project)?;
    store.save()?;
    project_show(store, &id)
}

pub fn project_show(store: &Store, id: &str) -> Result<ProjectDetail> {
    let project = store.get_project(id)?.clone();
    let progress = store.project_progress(id)?;
    Ok(ProjectDetail { project, progress })
}

pub fn project_list(
    store: &Store,
    status: Option<ProjectStatus>,
    tag: Option<&str>,
) -> Result<ProjectList> {
    let ids: Vec<String> = store
        .list_projects(status, tag)
        .into_iter()
        .map(|p| p.id.clone())
        .collect();
    let projects = ids
        .iter()
        .map(|id| project_show(store, id))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProjectList { projects })
}

pub fn project_update(store: &mut Store, id: &str, patch: ProjectPatch) -> Result<ProjectDetail> {
    store.update_project(id, patch)?;
    store.save()?;
    project_show(store, id)
}

pub fn project_delete(store: &mut Store, id: &str) -> Result<ProjectDeleted> {
    let cascaded_tasks = store.delete_project(id)?;
    store.save()?;
    Ok(ProjectDeleted {
        id: id.to_string(),
        cascaded_tasks,
    })
}

// === Tasks ===

/// A single task.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
}

impl CommandResult for TaskDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut line = format!(
            "{} {} [{}] priority {} impact {} effort {} roi {:.1}",
            self.task.id,
            self.task.name,
            self.task.status,
            self.task.priority,
            self.task.impact_score,
            self.task.effort_score,
            self.task.roi_score,
        );
        if !self.task.blockers.is_empty() {
            line.push_str(&format!("\n  blockers: {}", self.task.blockers.join("; ")));
        }
        line
    }
}

/// A list of tasks.
#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

impl CommandResult for TaskList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            return "No tasks.".to_string();
        }
        self.tasks
            .iter()
            .map(|t| {
                format!(
                    "{} [{}] roi {:.1} {}",
                    t.id, t.status, t.roi_score, t.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Confirmation of a deletion by id.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: String,
}

impl CommandResult for Deleted {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Deleted {}", self.id)
    }
}

#[allow(clippy::too_many_arguments)]
pub fn task_add(
    store: &mut Store,
    project_id: String,
    name: String,
    priority: Option<Priority>,
    impact: Option<u8>,
    effort: Option<u8>,
    estimate: Option<u32>,
    tags: Vec<String>,
    dependencies: Vec<String>,
) -> Result<TaskDetail> {
    let mut task = Task::new(
        store::generate_id(store::TASK_PREFIX, &name),
        project_id,
        name,
    );
    if let Some(priority) = priority {
        task.priority = priority;
    }
    if let Some(impact) = impact {
        task.impact_score = impact;
    }
    if let Some(effort) = effort {
        task.effort_score = effort;
    }
    task.estimated_minutes = estimate;
    task.tags = tags;
    task.dependencies = dependencies;

    let id = store.add_task(task)?;
    store.save()?;
    task_show(store, &id)
}

pub fn task_show(store: &Store, id: &str) -> Result<TaskDetail> {
    Ok(TaskDetail {
        task: store.get_task(id)?.clone(),
    })
}

pub fn task_list(
    store: &Store,
    project_id: Option<&str>,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    tag: Option<&str>,
) -> Result<TaskList> {
    Ok(TaskList {
        tasks: store
            .list_tasks(project_id, status, priority, tag)
            .into_iter()
            .cloned()
            .collect(),
    })
}

pub fn task_update(store: &mut Store, id: &str, patch: TaskPatch) -> Result<TaskDetail> {
    let task = store.update_task(id, patch)?;
    store.save()?;
    Ok(TaskDetail { task })
}

pub fn task_start(store: &mut Store, id: &str) -> Result<TaskDetail> {
    let task = store.start_task(id)?;
    store.save()?;
    Ok(TaskDetail { task })
}

pub fn task_complete(
    store: &mut Store,
    id: &str,
    actual_minutes: Option<u32>,
) -> Result<TaskDetail> {
    let task = store.complete_task(id, actual_minutes)?;
    store.save()?;
    Ok(TaskDetail { task })
}

pub fn task_block(store: &mut Store, id: &str, reason: String) -> Result<TaskDetail> {
    let task = store.block_task(id, reason)?;
    store.save()?;
    Ok(TaskDetail { task })
}

pub fn task_cancel(store: &mut Store, id: &str, note: Option<String>) -> Result<TaskDetail> {
    let task = store.cancel_task(id, note)?;
    store.save()?;
    Ok(TaskDetail { task })
}

pub fn task_delete(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_task(id)?;
    store.save()?;
    Ok(Deleted { id: id.to_string() })
}

// === Task logs ===

/// Task audit entries, newest first.
#[derive(Debug, Serialize)]
pub struct LogList {
    pub logs: Vec<TaskLog>,
}

impl CommandResult for LogList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.logs.is_empty() {
            return "No log entries.".to_string();
        }
        self.logs
            .iter()
            .map(|l| {
                let note = l
                    .note
                    .as_deref()
                    .map(|n| format!(" ({})", n))
                    .unwrap_or_default();
                format!("{} {} {}{}", l.timestamp, l.task_id, l.action, note)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn log_list(store: &Store, task_id: Option<&str>, limit: usize) -> Result<LogList> {
    Ok(LogList {
        logs: store
            .list_logs(task_id)
            .into_iter()
            .take(limit)
            .cloned()
            .collect(),
    })
}

// === Evaluations ===

/// An ROI verdict for a task or project.
#[derive(Debug, Serialize)]
pub struct EvaluationResult {
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

impl CommandResult for EvaluationResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let flag = if self.evaluation.flagged_for_removal {
            " [FLAGGED FOR REMOVAL]"
        } else {
            ""
        };
        format!(
            "{} roi {:.1} -> {} ({}){}\n  {}",
            self.evaluation.target_id,
            self.evaluation.roi,
            self.evaluation.recommendation,
            self.evaluation.priority,
            flag,
            self.evaluation.reasoning,
        )
    }
}

pub fn evaluate(store: &mut Store, id: &str, target: EvalTarget) -> Result<EvaluationResult> {
    let evaluation = store.evaluate_item(id, target)?;
    Ok(EvaluationResult { evaluation })
}

// === Access keys ===

/// A generated or revoked access key.
#[derive(Debug, Serialize)]
pub struct KeyResult {
    #[serde(flatten)]
    pub key: GeneratedKey,
}

impl CommandResult for KeyResult {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let state = if self.key.active { "active" } else { "revoked" };
        format!(
            "{} {} for {} [{}]",
            self.key.id, self.key.key, self.key.user_name, state
        )
    }
}

/// A list of access keys.
#[derive(Debug, Serialize)]
pub struct KeyList {
    pub keys: Vec<GeneratedKey>,
}

impl CommandResult for KeyList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.keys.is_empty() {
            return "No keys.".to_string();
        }
        self.keys
            .iter()
            .map(|k| {
                let state = if k.active { "active" } else { "revoked" };
                format!("{} {} [{}]", k.id, k.user_name, state)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn key_generate(store: &mut Store, user_name: String) -> Result<KeyResult> {
    let key = store.generate_key(user_name);
    store.save()?;
    Ok(KeyResult { key })
}

pub fn key_revoke(store: &mut Store, id: &str) -> Result<KeyResult> {
    let key = store.revoke_key(id)?;
    store.save()?;
    Ok(KeyResult { key })
}

pub fn key_list(store: &Store, active_only: bool) -> Result<KeyList> {
    Ok(KeyList {
        keys: store.list_keys(active_only).into_iter().cloned().collect(),
    })
}

// === Battle plans ===

/// A single battle plan.
#[derive(Debug, Serialize)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: BattlePlan,
}

impl CommandResult for PlanDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let mut out = format!(
            "{} {} ({}) [{}] progress {:.0}%",
            self.plan.id,
            self.plan.name,
            self.plan.plan_type,
            self.plan.status,
            self.plan.metrics.progress_percentage,
        );
        for obj in &self.plan.objectives {
            out.push_str(&format!(
                "\n  {} [{}] {} ({})",
                obj.id, obj.status, obj.description, obj.priority
            ));
        }
        for (i, trigger) in self.plan.pivot_triggers.iter().enumerate() {
            let fired = if trigger.triggered { " [FIRED]" } else { "" };
            out.push_str(&format!(
                "\n  pivot {}: if {} then {}{}",
                i, trigger.condition, trigger.action, fired
            ));
        }
        out
    }
}

/// A list of battle plans.
#[derive(Debug, Serialize)]
pub struct PlanList {
    pub plans: Vec<BattlePlan>,
}

impl CommandResult for PlanList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.plans.is_empty() {
            return "No plans.".to_string();
        }
        self.plans
            .iter()
            .map(|p| {
                format!(
                    "{} {} ({}) [{}] {} objective(s)",
                    p.id,
                    p.name,
                    p.plan_type,
                    p.status,
                    p.objectives.len()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn plan_add(store: &mut Store, name: String, plan_type: Option<String>) -> Result<PlanDetail> {
    let mut plan = BattlePlan::new(store::generate_id(store::PLAN_PREFIX, &name), name);
    if let Some(plan_type) = plan_type {
        plan.plan_type = plan_type;
    }
    let id = store.add_plan(plan)?;
    store.save()?;
    plan_show(store, &id)
}

pub fn plan_show(store: &Store, id: &str) -> Result<PlanDetail> {
    Ok(PlanDetail {
        plan: store.get_plan(id)?.clone(),
    })
}

pub fn plan_list(store: &Store, status: Option<ProjectStatus>) -> Result<PlanList> {
    Ok(PlanList {
        plans: store.list_plans(status).into_iter().cloned().collect(),
    })
}

pub fn plan_update(store: &mut Store, id: &str, patch: PlanPatch) -> Result<PlanDetail> {
    store.update_plan(id, patch)?;
    store.save()?;
    plan_show(store, id)
}

pub fn plan_delete(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_plan(id)?;
    store.save()?;
    Ok(Deleted { id: id.to_string() })
}

pub fn plan_objective_add(
    store: &mut Store,
    plan_id: &str,
    description: String,
    priority: Option<Priority>,
    criteria: Option<String>,
) -> Result<PlanDetail> {
    store.add_objective(
        plan_id,
        description,
        priority.unwrap_or_default(),
        criteria,
    )?;
    store.save()?;
    plan_show(store, plan_id)
}

pub fn plan_objective_status(
    store: &mut Store,
    plan_id: &str,
    objective_id: &str,
    status: TaskStatus,
) -> Result<PlanDetail> {
    store.set_objective_status(plan_id, objective_id, status)?;
    store.save()?;
    plan_show(store, plan_id)
}

pub fn plan_objective_link(
    store: &mut Store,
    plan_id: &str,
    objective_id: &str,
    task_id: &str,
) -> Result<PlanDetail> {
    store.link_task_to_objective(plan_id, objective_id, task_id)?;
    store.save()?;
    plan_show(store, plan_id)
}

pub fn plan_pivot_add(
    store: &mut Store,
    plan_id: &str,
    condition: String,
    action: String,
) -> Result<PlanDetail> {
    store.add_pivot_trigger(plan_id, condition, action)?;
    store.save()?;
    plan_show(store, plan_id)
}

pub fn plan_pivot_fire(store: &mut Store, plan_id: &str, index: usize) -> Result<PlanDetail> {
    store.mark_trigger_fired(plan_id, index)?;
    store.save()?;
    plan_show(store, plan_id)
}

pub fn plan_metrics_set(
    store: &mut Store,
    plan_id: &str,
    metrics: crate::models::PlanMetrics,
) -> Result<PlanDetail> {
    store.set_plan_metrics(plan_id, metrics)?;
    store.save()?;
    plan_show(store, plan_id)
}

// === Templates ===

/// A single template.
#[derive(Debug, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
}

impl CommandResult for TemplateDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let category = self.template.category.as_deref().unwrap_or("-");
        let mut out = format!(
            "{} {} [{}] used {}x avg rating {:.1}",
            self.template.id,
            self.template.name,
            category,
            self.template.usage_count,
            self.template.avg_rating,
        );
        for var in &self.template.variables {
            let req = if var.required { " (required)" } else { "" };
            out.push_str(&format!("\n  {{{{{}}}}}{}", var.name, req));
        }
        out
    }
}

/// A list of templates.
#[derive(Debug, Serialize)]
pub struct TemplateList {
    pub templates: Vec<Template>,
}

impl CommandResult for TemplateList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.templates.is_empty() {
            return "No templates.".to_string();
        }
        self.templates
            .iter()
            .map(|t| {
                format!(
                    "{} {} used {}x rating {:.1}",
                    t.id, t.name, t.usage_count, t.avg_rating
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The rendered body of a template.
#[derive(Debug, Serialize)]
pub struct RenderedTemplate {
    pub id: String,
    pub rendered: String,
}

impl CommandResult for RenderedTemplate {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.rendered.clone()
    }
}

pub fn template_add(
    store: &mut Store,
    name: String,
    content: String,
    category: Option<String>,
) -> Result<TemplateDetail> {
    let mut template = Template::new(
        store::generate_id(store::TEMPLATE_PREFIX, &name),
        name,
        content,
    );
    template.category = category;
    let id = store.add_template(template)?;
    store.save()?;
    template_show(store, &id)
}

pub fn template_show(store: &Store, id: &str) -> Result<TemplateDetail> {
    Ok(TemplateDetail {
        template: store.get_template(id)?.clone(),
    })
}

pub fn template_list(store: &Store, category: Option<&str>) -> Result<TemplateList> {
    Ok(TemplateList {
        templates: store
            .list_templates(category)
            .into_iter()
            .cloned()
            .collect(),
    })
}

pub fn template_update(
    store: &mut Store,
    id: &str,
    patch: TemplatePatch,
) -> Result<TemplateDetail> {
    store.update_template(id, patch)?;
    store.save()?;
    template_show(store, id)
}

pub fn template_var_add(
    store: &mut Store,
    id: &str,
    variable: TemplateVariable,
) -> Result<TemplateDetail> {
    store.add_template_variable(id, variable)?;
    store.save()?;
    template_show(store, id)
}

pub fn template_delete(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_template(id)?;
    store.save()?;
    Ok(Deleted { id: id.to_string() })
}

pub fn template_use(store: &mut Store, id: &str) -> Result<TemplateDetail> {
    store.use_template(id)?;
    store.save()?;
    template_show(store, id)
}

pub fn template_rate(store: &mut Store, id: &str, rating: f64) -> Result<TemplateDetail> {
    store.rate_template(id, rating)?;
    store.save()?;
    template_show(store, id)
}

pub fn template_render(
    store: &mut Store,
    id: &str,
    values: &BTreeMap<String, String>,
) -> Result<RenderedTemplate> {
    let rendered = store.render_template(id, values)?;
    store.save()?;
    Ok(RenderedTemplate {
        id: id.to_string(),
        rendered,
    })
}

// === Youtube refs ===

/// A single reference video.
#[derive(Debug, Serialize)]
pub struct RefDetail {
    #[serde(flatten)]
    pub youtube_ref: YoutubeRef,
}

impl CommandResult for RefDetail {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let watched = if self.youtube_ref.watched {
            "watched"
        } else {
            "unwatched"
        };
        format!(
            "{} {} [{}]\n  {}",
            self.youtube_ref.id, self.youtube_ref.title, watched, self.youtube_ref.url
        )
    }
}

/// A list of reference videos.
#[derive(Debug, Serialize)]
pub struct RefList {
    pub refs: Vec<YoutubeRef>,
}

impl CommandResult for RefList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.refs.is_empty() {
            return "No references.".to_string();
        }
        self.refs
            .iter()
            .map(|r| {
                let watched = if r.watched { "watched" } else { "unwatched" };
                format!("{} [{}] {}", r.id, watched, r.title)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn ref_add(
    store: &mut Store,
    title: String,
    url: String,
    channel: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
) -> Result<RefDetail> {
    let mut youtube_ref = YoutubeRef::new(
        store::generate_id(store::REF_PREFIX, &title),
        title,
        url,
    );
    youtube_ref.channel = channel;
    youtube_ref.category = category;
    youtube_ref.tags = tags;
    let id = store.add_ref(youtube_ref)?;
    store.save()?;
    ref_show(store, &id)
}

pub fn ref_show(store: &Store, id: &str) -> Result<RefDetail> {
    Ok(RefDetail {
        youtube_ref: store.get_ref(id)?.clone(),
    })
}

pub fn ref_list(
    store: &Store,
    category: Option<&str>,
    unwatched_only: bool,
) -> Result<RefList> {
    Ok(RefList {
        refs: store
            .list_refs(category, unwatched_only)
            .into_iter()
            .cloned()
            .collect(),
    })
}

pub fn ref_update(store: &mut Store, id: &str, patch: RefPatch) -> Result<RefDetail> {
    let youtube_ref = store.update_ref(id, patch)?;
    store.save()?;
    Ok(RefDetail { youtube_ref })
}

pub fn ref_watched(store: &mut Store, id: &str) -> Result<RefDetail> {
    let youtube_ref = store.mark_watched(id)?;
    store.save()?;
    Ok(RefDetail { youtube_ref })
}

pub fn ref_delete(store: &mut Store, id: &str) -> Result<Deleted> {
    store.delete_ref(id)?;
    store.save()?;
    Ok(Deleted { id: id.to_string() })
}

// === Rules and insights ===

/// The rule table.
#[derive(Debug, Serialize)]
pub struct RuleList {
    pub rules: Vec<Rule>,
}

impl CommandResult for RuleList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.rules
            .iter()
            .map(|r| {
                let state = if r.enabled { "on " } else { "off" };
                format!(
                    "[{}] {} {} (triggered {}x)",
                    state, r.id, r.name, r.trigger_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A toggled rule.
#[derive(Debug, Serialize)]
pub struct RuleToggled {
    #[serde(flatten)]
    pub rule: Rule,
}

impl CommandResult for RuleToggled {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        let state = if self.rule.enabled {
            "enabled"
        } else {
            "disabled"
        };
        format!("Rule {} is now {}", self.rule.id, state)
    }
}

/// Outcome of a rule run.
#[derive(Debug, Serialize)]
pub struct RuleRunReport {
    pub matches: Vec<RuleMatch>,
    pub insights_created: usize,
}

impl CommandResult for RuleRunReport {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.matches.is_empty() {
            return "No rules fired.".to_string();
        }
        let mut out = format!("{} insight(s) created:\n", self.insights_created);
        for m in &self.matches {
            out.push_str(&format!("  [{}] {}: {}\n", m.rule_id, m.task_id, m.reason));
        }
        out
    }
}

/// A list of insights.
#[derive(Debug, Serialize)]
pub struct InsightList {
    pub insights: Vec<Insight>,
}

impl CommandResult for InsightList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.insights.is_empty() {
            return "No insights.".to_string();
        }
        self.insights
            .iter()
            .map(|i| format!("{} {}\n  {}", i.id, i.title, i.body))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Count of cleared insights.
#[derive(Debug, Serialize)]
pub struct InsightsCleared {
    pub removed: usize,
}

impl CommandResult for InsightsCleared {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!("Cleared {} insight(s)", self.removed)
    }
}

pub fn rule_list(store: &Store) -> Result<RuleList> {
    Ok(RuleList {
        rules: store.rules().to_vec(),
    })
}

pub fn rule_toggle(store: &mut Store, id: &str) -> Result<RuleToggled> {
    let rule = store.toggle_rule(id)?;
    store.save()?;
    Ok(RuleToggled { rule })
}

pub fn rule_run(store: &mut Store) -> Result<RuleRunReport> {
    let matches = store.run_rules();
    store.save()?;
    Ok(RuleRunReport {
        insights_created: matches.len(),
        matches,
    })
}

pub fn insight_list(store: &Store, category: Option<&str>) -> Result<InsightList> {
    Ok(InsightList {
        insights: store
            .list_insights(category)
            .into_iter()
            .cloned()
            .collect(),
    })
}

pub fn insight_clear(store: &mut Store) -> Result<InsightsCleared> {
    let removed = store.clear_insights();
    store.save()?;
    Ok(InsightsCleared { removed })
}

// === Config ===

/// A single configuration value.
#[derive(Debug, Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
}

impl CommandResult for ConfigValue {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        match &self.value {
            Some(v) => format!("{} = {}", self.key, v),
            None => format!("{} is not set", self.key),
        }
    }
}

/// All configuration values.
#[derive(Debug, Serialize)]
pub struct ConfigList {
    pub settings: BTreeMap<String, String>,
}

impl CommandResult for ConfigList {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        if self.settings.is_empty() {
            return "No settings.".to_string();
        }
        self.settings
            .iter()
            .map(|(k, v)| format!("{} = {}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn config_get(store: &Store, key: &str) -> Result<ConfigValue> {
    Ok(ConfigValue {
        key: key.to_string(),
        value: store.get_setting(key).map(|v| v.to_string()),
    })
}

pub fn config_set(store: &mut Store, key: String, value: String) -> Result<ConfigValue> {
    store.set_setting(key.clone(), value.clone());
    store.save()?;
    Ok(ConfigValue {
        key,
        value: Some(value),
    })
}

pub fn config_list(store: &Store) -> Result<ConfigList> {
    Ok(ConfigList {
        settings: store.settings().clone(),
    })
}

// === System ===

/// Version and build metadata.
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub build_timestamp: String,
    pub git_commit: String,
}

impl CommandResult for BuildInfo {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        format!(
            "px {} (built {} from {})",
            self.version, self.build_timestamp, self.git_commit
        )
    }
}

/// Resolved data directory.
#[derive(Debug, Serialize)]
pub struct SystemPath {
    pub path: String,
}

impl CommandResult for SystemPath {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        self.path.clone()
    }
}

/// Confirmation of a full state reset.
#[derive(Debug, Serialize)]
pub struct SystemCleared {
    pub cleared: bool,
}

impl CommandResult for SystemCleared {
    fn to_json(&self) -> String {
        json_of(self)
    }

    fn to_human(&self) -> String {
        "All data cleared.".to_string()
    }
}

pub fn system_build_info() -> Result<BuildInfo> {
    Ok(BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_timestamp: env!("PX_BUILD_TIMESTAMP").to_string(),
        git_commit: env!("PX_GIT_COMMIT").to_string(),
    })
}

pub fn system_path(store: &Store) -> Result<SystemPath> {
    Ok(SystemPath {
        path: store.root().to_string_lossy().to_string(),
    })
}

pub fn system_clear(store: &mut Store) -> Result<SystemCleared> {
    store.clear()?;
    Ok(SystemCleared { cleared: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_project_add_and_list() {
        let env = TestEnv::new();
        let mut store = env.open_store();

        let detail = project_add(
            &mut store,
            "Launch".to_string(),
            Some("Ship v1".to_string()),
            Some(Priority::High),
            Some(8),
            None,
            vec!["q3".to_string()],
        )
        .unwrap();
        assert_eq!(detail.project.impact_score, 8);
        assert_eq!(detail.progress.tasks_count, 0);

        let list = project_list(&store, None, Some("q3")).unwrap();
        assert_eq!(list.projects.len(), 1);
        let none = project_list(&store, None, Some("q4")).unwrap();
        assert!(none.projects.is_empty());
    }

    #[test]
    fn test_task_lifecycle_via_commands() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let project = project_add(
            &mut store,
            "P".to_string(),
            None,
            None,
            None,
            None,
            vec![],
        )
        .unwrap();

        let task = task_add(
            &mut store,
            project.project.id.clone(),
            "Do it".to_string(),
            None,
            Some(8),
            Some(4),
            Some(60),
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(task.task.roi_score, 2.0);

        task_start(&mut store, &task.task.id).unwrap();
        let done = task_complete(&mut store, &task.task.id, Some(45)).unwrap();
        assert_eq!(done.task.status, TaskStatus::Completed);
        assert_eq!(done.task.actual_minutes, Some(45));

        let logs = log_list(&store, Some(&task.task.id), 50).unwrap();
        assert_eq!(logs.logs.len(), 3);
    }

    #[test]
    fn test_status_report_renders() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let project = project_add(
            &mut store,
            "P".to_string(),
            None,
            None,
            None,
            None,
            vec![],
        )
        .unwrap();
        task_add(
            &mut store,
            project.project.id.clone(),
            "Ready work".to_string(),
            None,
            Some(9),
            Some(3),
            None,
            vec![],
            vec![],
        )
        .unwrap();

        let report = status(&store).unwrap();
        assert_eq!(report.counts.tasks, 1);
        assert!(report.to_human().contains("Ready work"));
        assert!(report.to_json().contains("\"pending_tasks\": 1"));
    }

    #[test]
    fn test_evaluate_command_output() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let project = project_add(
            &mut store,
            "P".to_string(),
            None,
            None,
            Some(2),
            None,
            vec![],
        )
        .unwrap();

        let result = evaluate(&mut store, &project.project.id, EvalTarget::Project).unwrap();
        assert!(result.evaluation.flagged_for_removal);
        assert!(result.to_human().contains("FLAGGED FOR REMOVAL"));
    }

    #[test]
    fn test_config_roundtrip() {
        let env = TestEnv::new();
        let mut store = env.open_store();

        assert!(config_get(&store, "theme").unwrap().value.is_none());
        config_set(&mut store, "theme".to_string(), "dark".to_string()).unwrap();
        assert_eq!(
            config_get(&store, "theme").unwrap().value.as_deref(),
            Some("dark")
        );
        assert_eq!(config_list(&store).unwrap().settings.len(), 1);
    }
}
