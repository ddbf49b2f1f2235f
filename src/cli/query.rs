//! Query commands (ready, blocked, check, order)
//!
//! These read a snapshot of the task store and never write.

use anyhow::Result;
use tracing::debug;

use super::output::Output;
use crate::domain::{audit, completion_order, is_blocked, join_ids, TaskId};
use crate::storage::Project;

/// Show tasks ready to work on
pub fn ready(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let ready_tasks: Vec<_> = tasks
        .iter()
        .filter(|t| !t.completed && !is_blocked(t, &tasks).is_blocked())
        .collect();

    debug!(count = ready_tasks.len(), "found ready tasks");

    if output.is_json() {
        let items: Vec<_> = ready_tasks
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                })
            })
            .collect();
        output.data(&items);
    } else if ready_tasks.is_empty() {
        println!("No tasks ready to work on.");
    } else {
        println!("Ready tasks ({}):", ready_tasks.len());
        println!("{:<8} TITLE", "ID");
        println!("{}", "-".repeat(60));
        for task in ready_tasks {
            println!("{:<8} {}", task.id.to_string(), task.title);
        }
    }

    Ok(())
}

/// Show blocked tasks, or the blocking set of one task
pub fn blocked(output: &Output, id: Option<&str>) -> Result<()> {
    match id {
        Some(id_str) => blocked_by(output, id_str.parse()?),
        None => all_blocked(output),
    }
}

fn blocked_by(output: &Output, id: TaskId) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let task = tasks
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Task not found: {}", id))?;
    let status = is_blocked(task, &tasks);

    if output.is_json() {
        let blocking: Vec<_> = status
            .blocking()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "id": task.id,
            "blocked": status.is_blocked(),
            "blocking": blocking,
        }));
    } else if !status.is_blocked() {
        println!("{} is not blocked.", task.id);
    } else {
        println!("{} is blocked by:", task.id);
        for blocker in status.blocking() {
            println!("  {:<8} {}", blocker.id.to_string(), blocker.title);
        }
    }

    Ok(())
}

fn all_blocked(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let blocked_tasks: Vec<_> = tasks
        .iter()
        .filter(|t| !t.completed)
        .map(|t| (t, is_blocked(t, &tasks).blocking_ids()))
        .filter(|(_, blockers)| !blockers.is_empty())
        .collect();

    debug!(count = blocked_tasks.len(), "found blocked tasks");

    if output.is_json() {
        let items: Vec<_> = blocked_tasks
            .iter()
            .map(|(task, blockers)| {
                serde_json::json!({
                    "id": task.id,
                    "title": task.title,
                    "blocked_by": blockers,
                })
            })
            .collect();
        output.data(&items);
    } else if blocked_tasks.is_empty() {
        println!("No blocked tasks.");
    } else {
        println!("Blocked tasks ({}):", blocked_tasks.len());
        println!("{:<8} {:<30} BLOCKED BY", "ID", "TITLE");
        println!("{}", "-".repeat(60));
        for (task, blockers) in blocked_tasks {
            println!(
                "{:<8} {:<30} {}",
                task.id.to_string(),
                task.title,
                join_ids(&blockers, ", ")
            );
        }
    }

    Ok(())
}

/// Audit the whole graph; fails on anything but warnings
pub fn check(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let issues = audit(&tasks);
    let errors = issues.iter().filter(|i| !i.is_warning()).count();

    if output.is_json() {
        output.data(&serde_json::json!({
            "tasks": tasks.len(),
            "errors": errors,
            "warnings": issues.len() - errors,
            "issues": issues,
        }));
    } else if issues.is_empty() {
        println!("Checked {} task(s): no issues found.", tasks.len());
    } else {
        println!("Checked {} task(s):", tasks.len());
        for issue in &issues {
            let label = if issue.is_warning() { "warning" } else { "error" };
            println!("  - {}: {}", label, issue);
        }
    }

    if errors > 0 {
        anyhow::bail!("{} integrity issue(s) found", errors);
    }

    Ok(())
}

/// Print all tasks so that each follows its dependencies
pub fn order(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let tasks = project.task_store().read_all()?;

    let order = completion_order(&tasks)?;

    if output.is_json() {
        let items: Vec<_> = order
            .iter()
            .filter_map(|id| tasks.get(*id))
            .map(|t| {
                serde_json::json!({
                    "id": t.id,
                    "title": t.title,
                    "completed": t.completed,
                })
            })
            .collect();
        output.data(&items);
    } else if order.is_empty() {
        println!("No tasks");
    } else {
        for (pos, id) in order.iter().enumerate() {
            if let Some(task) = tasks.get(*id) {
                let mark = if task.completed { "[x]" } else { "[ ]" };
                println!("{:>4}. {} {:<8} {}", pos + 1, mark, task.id.to_string(), task.title);
            }
        }
    }

    Ok(())
}
