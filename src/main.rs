//! px CLI - a personal command center for projects, tasks, and plans.

use clap::Parser;
use pexos::cli::{
    Cli, Commands, ConfigCommands, InsightCommands, KeyCommands, PlanCommands, ProjectCommands,
    RefCommands, RuleCommands, SystemCommands, TaskCommands, TemplateCommands,
};
use pexos::commands::{self, CommandResult};
use pexos::models::{PlanMetrics, TemplateVariable};
use pexos::store::{persist, PlanPatch, ProjectPatch, RefPatch, Store, TaskPatch, TemplatePatch};
use pexos::{action_log, Error};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    // Determine data dir: --data-dir flag > PX_DATA_DIR env > platform default
    let data_dir = resolve_data_dir(cli.data_dir, human);

    // Serialize command for logging
    let (cmd_name, args_json) = serialize_command(&cli.command);

    // Start timing
    let start = Instant::now();

    // Execute command
    let result = run_command(cli.command, &data_dir, human);

    // Calculate duration
    let duration = start.elapsed().as_millis() as u64;

    // Determine success/error
    let (success, error) = match &result {
        Ok(_) => (true, None),
        Err(e) => (false, Some(e.to_string())),
    };

    // Log the action (best-effort; warnings only)
    action_log::log_action(&data_dir, &cmd_name, args_json, success, error, duration);

    // Handle result
    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Resolve the data directory from the explicit flag or platform defaults.
fn resolve_data_dir(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => path,
        None => persist::resolve_data_dir().unwrap_or_else(|e| {
            if human {
                eprintln!("Error: Could not resolve data directory: {}", e);
            } else {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": format!("Could not resolve data directory: {}", e)
                    })
                );
            }
            process::exit(1);
        }),
    }
}

fn run_command(command: Option<Commands>, data_dir: &Path, human: bool) -> Result<(), Error> {
    let mut store = Store::open_at(data_dir)?;

    match command {
        None => output(&commands::status(&store)?, human),

        Some(Commands::Project { command }) => match command {
            ProjectCommands::Add {
                name,
                description,
                priority,
                impact,
                owner,
                tags,
            } => output(
                &commands::project_add(&mut store, name, description, priority, impact, owner, tags)?,
                human,
            ),
            ProjectCommands::Show { id } => output(&commands::project_show(&store, &id)?, human),
            ProjectCommands::List { status, tag } => output(
                &commands::project_list(&store, status, tag.as_deref())?,
                human,
            ),
            ProjectCommands::Update {
                id,
                name,
                description,
                status,
                priority,
                impact,
                owner,
                add_tags,
                remove_tags,
            } => {
                let patch = ProjectPatch {
                    name,
                    description,
                    status,
                    priority,
                    impact_score: impact,
                    owner,
                    add_tags,
                    remove_tags,
                };
                output(&commands::project_update(&mut store, &id, patch)?, human)
            }
            ProjectCommands::Delete { id } => {
                output(&commands::project_delete(&mut store, &id)?, human)
            }
        },

        Some(Commands::Task { command }) => match command {
            TaskCommands::Add {
                project_id,
                name,
                priority,
                impact,
                effort,
                estimate,
                tags,
                dependencies,
            } => output(
                &commands::task_add(
                    &mut store,
                    project_id,
                    name,
                    priority,
                    impact,
                    effort,
                    estimate,
                    tags,
                    dependencies,
                )?,
                human,
            ),
            TaskCommands::Show { id } => output(&commands::task_show(&store, &id)?, human),
            TaskCommands::List {
                project,
                status,
                priority,
                tag,
            } => output(
                &commands::task_list(
                    &store,
                    project.as_deref(),
                    status,
                    priority,
                    tag.as_deref(),
                )?,
                human,
            ),
            TaskCommands::Update {
                id,
                name,
                priority,
                impact,
                effort,
                estimate,
                actual,
                add_tags,
                remove_tags,
                add_deps,
            } => {
                let patch = TaskPatch {
                    name,
                    priority,
                    impact_score: impact,
                    effort_score: effort,
                    estimated_minutes: estimate,
                    actual_minutes: actual,
                    add_tags,
                    remove_tags,
                    add_dependencies: add_deps,
                };
                output(&commands::task_update(&mut store, &id, patch)?, human)
            }
            TaskCommands::Start { id } => output(&commands::task_start(&mut store, &id)?, human),
            TaskCommands::Complete { id, minutes } => {
                output(&commands::task_complete(&mut store, &id, minutes)?, human)
            }
            TaskCommands::Block { id, reason } => {
                output(&commands::task_block(&mut store, &id, reason)?, human)
            }
            TaskCommands::Cancel { id, note } => {
                output(&commands::task_cancel(&mut store, &id, note)?, human)
            }
            TaskCommands::Delete { id } => output(&commands::task_delete(&mut store, &id)?, human),
        },

        Some(Commands::Plan { command }) => match command {
            PlanCommands::Add { name, plan_type } => {
                output(&commands::plan_add(&mut store, name, plan_type)?, human)
            }
            PlanCommands::Show { id } => output(&commands::plan_show(&store, &id)?, human),
            PlanCommands::List { status } => output(&commands::plan_list(&store, status)?, human),
            PlanCommands::Update {
                id,
                name,
                plan_type,
                status,
            } => {
                let patch = PlanPatch {
                    name,
                    plan_type,
                    status,
                };
                output(&commands::plan_update(&mut store, &id, patch)?, human)
            }
            PlanCommands::Delete { id } => output(&commands::plan_delete(&mut store, &id)?, human),
            PlanCommands::ObjectiveAdd {
                plan_id,
                description,
                priority,
                criteria,
            } => output(
                &commands::plan_objective_add(&mut store, &plan_id, description, priority, criteria)?,
                human,
            ),
            PlanCommands::ObjectiveStatus {
                plan_id,
                objective_id,
                status,
            } => output(
                &commands::plan_objective_status(&mut store, &plan_id, &objective_id, status)?,
                human,
            ),
            PlanCommands::ObjectiveLink {
                plan_id,
                objective_id,
                task_id,
            } => output(
                &commands::plan_objective_link(&mut store, &plan_id, &objective_id, &task_id)?,
                human,
            ),
            PlanCommands::PivotAdd {
                plan_id,
                condition,
                action,
            } => output(
                &commands::plan_pivot_add(&mut store, &plan_id, condition, action)?,
                human,
            ),
            PlanCommands::PivotFire { plan_id, index } => output(
                &commands::plan_pivot_fire(&mut store, &plan_id, index)?,
                human,
            ),
            PlanCommands::Metrics {
                plan_id,
                objectives_total,
                objectives_completed,
                blocker_count,
                velocity,
                progress,
            } => {
                let metrics = PlanMetrics {
                    objectives_total,
                    objectives_completed,
                    blocker_count,
                    velocity_score: velocity,
                    progress_percentage: progress,
                };
                output(
                    &commands::plan_metrics_set(&mut store, &plan_id, metrics)?,
                    human,
                )
            }
        },

        Some(Commands::Template { command }) => match command {
            TemplateCommands::Add {
                name,
                content,
                category,
            } => output(
                &commands::template_add(&mut store, name, content, category)?,
                human,
            ),
            TemplateCommands::Show { id } => output(&commands::template_show(&store, &id)?, human),
            TemplateCommands::List { category } => output(
                &commands::template_list(&store, category.as_deref())?,
                human,
            ),
            TemplateCommands::Update {
                id,
                name,
                category,
                content,
            } => {
                let patch = TemplatePatch {
                    name,
                    category,
                    content,
                };
                output(&commands::template_update(&mut store, &id, patch)?, human)
            }
            TemplateCommands::VarAdd {
                id,
                name,
                var_type,
                required,
                options,
            } => {
                let variable = TemplateVariable {
                    name,
                    var_type,
                    required,
                    options,
                };
                output(&commands::template_var_add(&mut store, &id, variable)?, human)
            }
            TemplateCommands::Delete { id } => {
                output(&commands::template_delete(&mut store, &id)?, human)
            }
            TemplateCommands::Use { id } => output(&commands::template_use(&mut store, &id)?, human),
            TemplateCommands::Rate { id, rating } => {
                output(&commands::template_rate(&mut store, &id, rating)?, human)
            }
            TemplateCommands::Render { id, vars } => {
                let values = vars.into_iter().collect();
                output(&commands::template_render(&mut store, &id, &values)?, human)
            }
        },

        Some(Commands::Ref { command }) => match command {
            RefCommands::Add {
                title,
                url,
                channel,
                category,
                tags,
            } => output(
                &commands::ref_add(&mut store, title, url, channel, category, tags)?,
                human,
            ),
            RefCommands::Show { id } => output(&commands::ref_show(&store, &id)?, human),
            RefCommands::List {
                category,
                unwatched,
            } => output(
                &commands::ref_list(&store, category.as_deref(), unwatched)?,
                human,
            ),
            RefCommands::Update {
                id,
                title,
                channel,
                category,
                notes,
                add_tags,
            } => {
                let patch = RefPatch {
                    title,
                    channel,
                    category,
                    notes,
                    add_tags,
                };
                output(&commands::ref_update(&mut store, &id, patch)?, human)
            }
            RefCommands::Watched { id } => output(&commands::ref_watched(&mut store, &id)?, human),
            RefCommands::Delete { id } => output(&commands::ref_delete(&mut store, &id)?, human),
        },

        Some(Commands::Key { command }) => match command {
            KeyCommands::Generate { user_name } => {
                output(&commands::key_generate(&mut store, user_name)?, human)
            }
            KeyCommands::Revoke { id } => output(&commands::key_revoke(&mut store, &id)?, human),
            KeyCommands::List { active } => output(&commands::key_list(&store, active)?, human),
        },

        Some(Commands::Rule { command }) => match command {
            RuleCommands::List => output(&commands::rule_list(&store)?, human),
            RuleCommands::Toggle { id } => output(&commands::rule_toggle(&mut store, &id)?, human),
            RuleCommands::Run => output(&commands::rule_run(&mut store)?, human),
        },

        Some(Commands::Insight { command }) => match command {
            InsightCommands::List { category } => output(
                &commands::insight_list(&store, category.as_deref())?,
                human,
            ),
            InsightCommands::Clear => output(&commands::insight_clear(&mut store)?, human),
        },

        Some(Commands::Evaluate { id, target }) => {
            output(&commands::evaluate(&mut store, &id, target)?, human)
        }

        Some(Commands::Log { task_id, limit }) => output(
            &commands::log_list(&store, task_id.as_deref(), limit)?,
            human,
        ),

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Get { key } => output(&commands::config_get(&store, &key)?, human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(&mut store, key, value)?, human)
            }
            ConfigCommands::List => output(&commands::config_list(&store)?, human),
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::BuildInfo => output(&commands::system_build_info()?, human),
            SystemCommands::Path => output(&commands::system_path(&store)?, human),
            SystemCommands::Clear { force } => {
                if !force {
                    return Err(Error::InvalidInput(
                        "This deletes all data. Pass --force to confirm.".to_string(),
                    ));
                }
                output(&commands::system_clear(&mut store)?, human)
            }
        },
    }

    Ok(())
}

fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

/// Name and argument summary of a command, for the action log.
fn serialize_command(command: &Option<Commands>) -> (String, serde_json::Value) {
    match command {
        None => ("status".to_string(), serde_json::json!({})),

        Some(Commands::Project { command }) => match command {
            ProjectCommands::Add { name, tags, .. } => (
                "project add".to_string(),
                serde_json::json!({ "name": name, "tags": tags }),
            ),
            ProjectCommands::Show { id } => {
                ("project show".to_string(), serde_json::json!({ "id": id }))
            }
            ProjectCommands::List { status, tag } => (
                "project list".to_string(),
                serde_json::json!({ "status": status, "tag": tag }),
            ),
            ProjectCommands::Update { id, .. } => (
                "project update".to_string(),
                serde_json::json!({ "id": id }),
            ),
            ProjectCommands::Delete { id } => (
                "project delete".to_string(),
                serde_json::json!({ "id": id }),
            ),
        },

        Some(Commands::Task { command }) => match command {
            TaskCommands::Add {
                project_id, name, ..
            } => (
                "task add".to_string(),
                serde_json::json!({ "project_id": project_id, "name": name }),
            ),
            TaskCommands::Show { id } => ("task show".to_string(), serde_json::json!({ "id": id })),
            TaskCommands::List {
                project, status, ..
            } => (
                "task list".to_string(),
                serde_json::json!({ "project": project, "status": status }),
            ),
            TaskCommands::Update { id, .. } => {
                ("task update".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::Start { id } => {
                ("task start".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::Complete { id, minutes } => (
                "task complete".to_string(),
                serde_json::json!({ "id": id, "minutes": minutes }),
            ),
            TaskCommands::Block { id, reason } => (
                "task block".to_string(),
                serde_json::json!({ "id": id, "reason": reason }),
            ),
            TaskCommands::Cancel { id, .. } => {
                ("task cancel".to_string(), serde_json::json!({ "id": id }))
            }
            TaskCommands::Delete { id } => {
                ("task delete".to_string(), serde_json::json!({ "id": id }))
            }
        },

        Some(Commands::Plan { command }) => match command {
            PlanCommands::Add { name, plan_type } => (
                "plan add".to_string(),
                serde_json::json!({ "name": name, "type": plan_type }),
            ),
            PlanCommands::Show { id } => ("plan show".to_string(), serde_json::json!({ "id": id })),
            PlanCommands::List { status } => (
                "plan list".to_string(),
                serde_json::json!({ "status": status }),
            ),
            PlanCommands::Update { id, .. } => {
                ("plan update".to_string(), serde_json::json!({ "id": id }))
            }
            PlanCommands::Delete { id } => {
                ("plan delete".to_string(), serde_json::json!({ "id": id }))
            }
            PlanCommands::ObjectiveAdd { plan_id, .. } => (
                "plan objective-add".to_string(),
                serde_json::json!({ "plan_id": plan_id }),
            ),
            PlanCommands::ObjectiveStatus {
                plan_id,
                objective_id,
                status,
            } => (
                "plan objective-status".to_string(),
                serde_json::json!({ "plan_id": plan_id, "objective_id": objective_id, "status": status }),
            ),
            PlanCommands::ObjectiveLink {
                plan_id,
                objective_id,
                task_id,
            } => (
                "plan objective-link".to_string(),
                serde_json::json!({ "plan_id": plan_id, "objective_id": objective_id, "task_id": task_id }),
            ),
            PlanCommands::PivotAdd { plan_id, .. } => (
                "plan pivot-add".to_string(),
                serde_json::json!({ "plan_id": plan_id }),
            ),
            PlanCommands::PivotFire { plan_id, index } => (
                "plan pivot-fire".to_string(),
                serde_json::json!({ "plan_id": plan_id, "index": index }),
            ),
            PlanCommands::Metrics { plan_id, .. } => (
                "plan metrics".to_string(),
                serde_json::json!({ "plan_id": plan_id }),
            ),
        },

        Some(Commands::Template { command }) => match command {
            TemplateCommands::Add { name, category, .. } => (
                "template add".to_string(),
                serde_json::json!({ "name": name, "category": category }),
            ),
            TemplateCommands::Show { id } => (
                "template show".to_string(),
                serde_json::json!({ "id": id }),
            ),
            TemplateCommands::List { category } => (
                "template list".to_string(),
                serde_json::json!({ "category": category }),
            ),
            TemplateCommands::Update { id, .. } => (
                "template update".to_string(),
                serde_json::json!({ "id": id }),
            ),
            TemplateCommands::VarAdd { id, name, .. } => (
                "template var-add".to_string(),
                serde_json::json!({ "id": id, "name": name }),
            ),
            TemplateCommands::Delete { id } => (
                "template delete".to_string(),
                serde_json::json!({ "id": id }),
            ),
            TemplateCommands::Use { id } => {
                ("template use".to_string(), serde_json::json!({ "id": id }))
            }
            TemplateCommands::Rate { id, rating } => (
                "template rate".to_string(),
                serde_json::json!({ "id": id, "rating": rating }),
            ),
            TemplateCommands::Render { id, .. } => (
                "template render".to_string(),
                serde_json::json!({ "id": id }),
            ),
        },

        Some(Commands::Ref { command }) => match command {
            RefCommands::Add { title, .. } => (
                "ref add".to_string(),
                serde_json::json!({ "title": title }),
            ),
            RefCommands::Show { id } => ("ref show".to_string(), serde_json::json!({ "id": id })),
            RefCommands::List {
                category,
                unwatched,
            } => (
                "ref list".to_string(),
                serde_json::json!({ "category": category, "unwatched": unwatched }),
            ),
            RefCommands::Update { id, .. } => {
                ("ref update".to_string(), serde_json::json!({ "id": id }))
            }
            RefCommands::Watched { id } => {
                ("ref watched".to_string(), serde_json::json!({ "id": id }))
            }
            RefCommands::Delete { id } => {
                ("ref delete".to_string(), serde_json::json!({ "id": id }))
            }
        },

        Some(Commands::Key { command }) => match command {
            KeyCommands::Generate { user_name } => (
                "key generate".to_string(),
                serde_json::json!({ "user_name": user_name }),
            ),
            KeyCommands::Revoke { id } => {
                ("key revoke".to_string(), serde_json::json!({ "id": id }))
            }
            KeyCommands::List { active } => (
                "key list".to_string(),
                serde_json::json!({ "active": active }),
            ),
        },

        Some(Commands::Rule { command }) => match command {
            RuleCommands::List => ("rule list".to_string(), serde_json::json!({})),
            RuleCommands::Toggle { id } => {
                ("rule toggle".to_string(), serde_json::json!({ "id": id }))
            }
            RuleCommands::Run => ("rule run".to_string(), serde_json::json!({})),
        },

        Some(Commands::Insight { command }) => match command {
            InsightCommands::List { category } => (
                "insight list".to_string(),
                serde_json::json!({ "category": category }),
            ),
            InsightCommands::Clear => ("insight clear".to_string(), serde_json::json!({})),
        },

        Some(Commands::Evaluate { id, target }) => (
            "evaluate".to_string(),
            serde_json::json!({ "id": id, "target": target }),
        ),

        Some(Commands::Log { task_id, limit }) => (
            "log".to_string(),
            serde_json::json!({ "task_id": task_id, "limit": limit }),
        ),

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Get { key } => {
                ("config get".to_string(), serde_json::json!({ "key": key }))
            }
            ConfigCommands::Set { key, .. } => {
                ("config set".to_string(), serde_json::json!({ "key": key }))
            }
            ConfigCommands::List => ("config list".to_string(), serde_json::json!({})),
        },

        Some(Commands::System { command }) => match command {
            SystemCommands::BuildInfo => ("system build-info".to_string(), serde_json::json!({})),
            SystemCommands::Path => ("system path".to_string(), serde_json::json!({})),
            SystemCommands::Clear { force } => (
                "system clear".to_string(),
                serde_json::json!({ "force": force }),
            ),
        },
    }
}
