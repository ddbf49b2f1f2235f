//! Task CLI commands

use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

use super::output::Output;
use crate::domain::{
    add_dependency, complete_task, dependency_chain, detach_task, is_blocked, join_ids,
    remove_dependency, reopen_task, validate_dependencies, Dependencies, DependencyError, Task,
    TaskId, TaskSet,
};
use crate::storage::Project;

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task
    ///
    /// Examples:
    ///   taskdeps task add "Write schema"
    ///   taskdeps task add "Build API" --depends-on 1 --depends-on 2
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Task that must be completed first (repeatable)
        #[arg(long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,
    },

    /// List all tasks
    List,

    /// Show task details
    Show {
        /// Task ID
        id: String,
    },

    /// Mark task as done (refused while it is blocked)
    Done {
        /// Task ID
        id: String,
    },

    /// Mark a completed task as not done
    Reopen {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,

        /// Also delete if other tasks depend on it, removing those edges
        #[arg(long)]
        force: bool,
    },

    /// Add a dependency between tasks
    Dep {
        /// Task that will be blocked
        task: String,

        /// Task that must be completed first
        depends_on: String,
    },

    /// Remove a dependency
    Undep {
        /// Task to unblock
        task: String,

        /// Dependency to remove
        depends_on: String,
    },

    /// Show every task that must be completed first, in order
    Chain {
        /// Task ID
        id: String,
    },
}

pub fn run(cmd: TaskCommands, output: &Output) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            description,
            depends_on,
        } => add_task(output, &title, description, &depends_on),
        TaskCommands::List => list_tasks(output),
        TaskCommands::Show { id } => show_task(output, &id),
        TaskCommands::Done { id } => finish_task(output, &id),
        TaskCommands::Reopen { id } => reopen(output, &id),
        TaskCommands::Rm { id, force } => remove_task(output, &id, force),
        TaskCommands::Dep { task, depends_on } => add_dep(output, &task, &depends_on),
        TaskCommands::Undep { task, depends_on } => remove_dep(output, &task, &depends_on),
        TaskCommands::Chain { id } => show_chain(output, &id),
    }
}

/// Short status label used in listings
fn status_label(task: &Task, tasks: &TaskSet) -> &'static str {
    if task.completed {
        "done"
    } else if is_blocked(task, tasks).is_blocked() {
        "blocked"
    } else {
        "ready"
    }
}

fn add_task(
    output: &Output,
    title: &str,
    description: Option<String>,
    depends_on: &[String],
) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let dependencies = depends_on
        .iter()
        .map(|s| s.parse::<TaskId>())
        .collect::<Result<Dependencies, _>>()?;

    let task = store.transaction(|tasks| {
        let id = tasks.next_id()?;
        validate_dependencies(id, dependencies.as_slice(), tasks)?;

        let mut task = Task::new(id, title);
        if let Some(description) = description {
            task = task.with_description(description);
        }
        task.depends_on = dependencies;
        if tasks.insert(task.clone()).is_some() {
            return Err(DependencyError::DuplicateTask(id).into());
        }
        Ok(task)
    })?;

    debug!(task = %task.id, deps = task.depends_on.len(), "created task");

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "completed": task.completed,
            "depends_on": task.depends_on,
        }));
    } else {
        output.success(&format!("Created task: {} - {}", task.id, task.title));
    }

    Ok(())
}

fn list_tasks(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    if output.is_json() {
        let items: Vec<_> = tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "completed": t.completed,
                    "blocked": is_blocked(t, &tasks).is_blocked(),
                    "depends_on": t.depends_on,
                })
            })
            .collect();
        output.data(&items);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        println!("{:<8} {:<10} {:<40} DEPENDS ON", "ID", "STATUS", "TITLE");
        println!("{}", "-".repeat(72));

        for task in tasks.iter() {
            let deps = task
                .depends_on
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{:<8} {:<10} {:<40} {}",
                task.id.to_string(),
                status_label(task, &tasks),
                task.title,
                deps
            );
        }
    }

    Ok(())
}

fn show_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let id: TaskId = id_str.parse()?;
    let task = tasks
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;

    let status = is_blocked(task, &tasks);
    let dependents = tasks.dependents(id);

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "title": task.title,
            "description": task.description,
            "completed": task.completed,
            "depends_on": task.depends_on,
            "dependents": dependents,
            "blocked": status.is_blocked(),
            "blocking": status.blocking_ids(),
            "created_at": task.created_at,
            "updated_at": task.updated_at,
            "completed_at": task.completed_at,
        }));
    } else {
        println!("Task: {}", task.id);
        println!("Title: {}", task.title);
        println!("Status: {}", status_label(task, &tasks));
        println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
        println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

        if let Some(completed) = task.completed_at {
            println!("Completed: {}", completed.format("%Y-%m-%d %H:%M"));
        }

        if !task.depends_on.is_empty() {
            println!("\nDepends on:");
            for dep in task.depends_on.iter() {
                match tasks.get(dep) {
                    Some(t) => println!(
                        "  {} {} ({})",
                        dep,
                        t.title,
                        if t.completed { "done" } else { "open" }
                    ),
                    None => println!("  {} (missing)", dep),
                }
            }
        }

        if !dependents.is_empty() {
            println!("\nRequired by:");
            for dependent in &dependents {
                if let Some(t) = tasks.get(*dependent) {
                    println!("  {} {}", dependent, t.title);
                }
            }
        }

        if let Some(desc) = &task.description {
            println!("\nDescription:");
            println!("{}", desc);
        }

        println!();
        if task.completed {
            println!("Status: DONE");
        } else if status.is_blocked() {
            let ids: Vec<_> = status.blocking_ids();
            println!(
                "Status: BLOCKED (waiting on {})",
                join_ids(&ids, ", ")
            );
        } else {
            println!("Status: READY (all dependencies complete)");
        }
    }

    Ok(())
}

fn finish_task(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let task = store.transaction(|tasks| Ok(complete_task(id, tasks)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "completed": task.completed,
            "completed_at": task.completed_at,
        }));
    } else {
        output.success(&format!("Completed task: {}", task.id));
    }

    Ok(())
}

fn reopen(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let id: TaskId = id_str.parse()?;
    let task = store.transaction(|tasks| Ok(reopen_task(id, tasks)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "completed": task.completed,
        }));
    } else {
        output.success(&format!("Reopened task: {}", task.id));
    }

    Ok(())
}

fn remove_task(output: &Output, id_str: &str, force: bool) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();
    let force = force || project.config().project.force_delete;

    let id: TaskId = id_str.parse()?;
    let (task, detached_from) = store.transaction(|tasks| {
        let dependents = tasks.dependents(id);
        let task = detach_task(id, tasks, force)?;
        Ok((task, dependents))
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": task.id,
            "removed": true,
            "detached_from": detached_from,
        }));
    } else {
        output.success(&format!("Deleted task: {} - {}", task.id, task.title));
        for dependent in detached_from {
            println!("  {} no longer depends on {}", dependent, task.id);
        }
    }

    Ok(())
}

fn add_dep(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let task = store.transaction(|tasks| Ok(add_dependency(task_id, depends_on_id, tasks)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task.id,
            "depends_on": depends_on_id,
            "dependencies": task.depends_on,
        }));
    } else {
        output.success(&format!("{} now depends on {}", task_id, depends_on_id));
    }

    Ok(())
}

fn remove_dep(output: &Output, task_str: &str, depends_on_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.task_store();

    let task_id: TaskId = task_str.parse()?;
    let depends_on_id: TaskId = depends_on_str.parse()?;

    let task =
        store.transaction(|tasks| Ok(remove_dependency(task_id, depends_on_id, tasks)?))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task.id,
            "removed_dependency": depends_on_id,
            "dependencies": task.depends_on,
        }));
    } else {
        output.success(&format!(
            "Removed dependency: {} no longer depends on {}",
            task_id, depends_on_id
        ));
    }

    Ok(())
}

fn show_chain(output: &Output, id_str: &str) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;
    let hide_completed = project.config().project.hide_completed_in_chain;

    let id: TaskId = id_str.parse()?;
    let chain: Vec<&Task> = dependency_chain(id, &tasks)?
        .into_iter()
        .filter_map(|dep| tasks.get(dep))
        .filter(|t| !(hide_completed && t.completed))
        .collect();

    if output.is_json() {
        let items: Vec<_> = chain
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "completed": t.completed,
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "task": id,
            "chain": items,
        }));
    } else if chain.is_empty() {
        println!("{} has no outstanding dependencies", id);
    } else {
        println!("Complete before {} (in order):", id);
        for (pos, task) in chain.iter().enumerate() {
            let mark = if task.completed { "[x]" } else { "[ ]" };
            println!("  {:>3}. {} {:<8} {}", pos + 1, mark, task.id.to_string(), task.title);
        }
    }

    Ok(())
}
