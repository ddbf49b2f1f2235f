//! Dependency graph engine
//!
//! Validates and applies changes to the `depends_on` edges of a [`TaskSet`],
//! and answers the blocking and chain queries built on those edges.
//!
//! Every mutation validates before it mutates: on error the task set is left
//! exactly as it was. After every successful call:
//! - no task depends on itself
//! - the edges form no cycle
//! - every dependency refers to an existing task
//! - no dependency set holds duplicates
//! - no task was completed while one of its dependencies was incomplete
//!
//! The engine keeps no state between calls and performs no I/O. Callers that
//! share a task set across threads must serialize mutations themselves.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::cycle::{CyclePath, ProposedGraph};
use super::id::{join_ids, TaskId};
use super::task::Task;
use super::task_set::TaskSet;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Dependency task {0} does not exist")]
    UnknownDependency(TaskId),

    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(CyclePath),

    #[error("Task {task} already depends on {dependency}")]
    AlreadyDependent { task: TaskId, dependency: TaskId },

    #[error("Task {task} does not depend on {dependency}")]
    NotDependent { task: TaskId, dependency: TaskId },

    #[error("Task {task} is blocked by incomplete dependencies: {}", join_ids(.blocking, ", "))]
    BlockedCompletion { task: TaskId, blocking: Vec<TaskId> },

    #[error("Task {task} is still required by: {}", join_ids(.dependents, ", "))]
    HasDependents { task: TaskId, dependents: Vec<TaskId> },

    #[error("No task IDs left after {0}")]
    IdsExhausted(TaskId),

    #[error("Task {0} already exists")]
    DuplicateTask(TaskId),
}

/// Result of a blocking query
#[derive(Debug, Clone, PartialEq)]
pub struct BlockingStatus<'a> {
    blocking: Vec<&'a Task>,
}

impl<'a> BlockingStatus<'a> {
    /// Returns true if at least one direct dependency is incomplete
    pub fn is_blocked(&self) -> bool {
        !self.blocking.is_empty()
    }

    /// Incomplete direct dependencies, in `depends_on` order
    pub fn blocking(&self) -> &[&'a Task] {
        &self.blocking
    }

    /// IDs of the incomplete direct dependencies
    pub fn blocking_ids(&self) -> Vec<TaskId> {
        self.blocking.iter().map(|t| t.id).collect()
    }
}

/// Checks a task's full proposed dependency list against the task set
///
/// `proposed` is the complete list the task would have (existing plus new),
/// not just the additions. Checks run in order and stop at the first
/// failure: every ID exists, none is the task itself, and no candidate edge
/// closes a cycle. Each candidate is checked independently against the
/// current graph, so a batch of k candidates costs O(k·(V+E)).
pub fn validate_dependencies(
    task_id: TaskId,
    proposed: &[TaskId],
    tasks: &TaskSet,
) -> Result<(), DependencyError> {
    if let Some(&missing) = proposed.iter().find(|&&dep| !tasks.contains(dep)) {
        return Err(DependencyError::UnknownDependency(missing));
    }

    if proposed.contains(&task_id) {
        return Err(DependencyError::SelfDependency(task_id));
    }

    for &candidate in proposed {
        let graph = ProposedGraph::with_edge(tasks, task_id, candidate);
        if let Some(cycle) = graph.find_cycle_through(candidate) {
            debug!(task = %task_id, dependency = %candidate, cycle = %cycle, "rejected cyclic dependency");
            return Err(DependencyError::CircularDependency(cycle));
        }
    }

    Ok(())
}

/// Makes `task_id` depend on `dependency_id`
///
/// Adding an edge that already exists is an error, not a no-op. On success
/// the edge is appended and a copy of the updated task is returned.
pub fn add_dependency(
    task_id: TaskId,
    dependency_id: TaskId,
    tasks: &mut TaskSet,
) -> Result<Task, DependencyError> {
    let task = tasks
        .get(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;

    if task.depends_on.contains(dependency_id) {
        return Err(DependencyError::AlreadyDependent {
            task: task_id,
            dependency: dependency_id,
        });
    }

    let mut proposed = task.depends_on.as_slice().to_vec();
    proposed.push(dependency_id);
    validate_dependencies(task_id, &proposed, tasks)?;

    let task = tasks
        .get_mut(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;
    task.push_dependency(dependency_id);
    debug!(task = %task_id, dependency = %dependency_id, "dependency added");

    Ok(task.clone())
}

/// Removes the edge `task_id -> dependency_id`
///
/// Removing an edge can neither create a cycle nor a dangling reference, so
/// nothing is revalidated.
pub fn remove_dependency(
    task_id: TaskId,
    dependency_id: TaskId,
    tasks: &mut TaskSet,
) -> Result<Task, DependencyError> {
    let task = tasks
        .get_mut(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;

    if !task.drop_dependency(dependency_id) {
        return Err(DependencyError::NotDependent {
            task: task_id,
            dependency: dependency_id,
        });
    }
    debug!(task = %task_id, dependency = %dependency_id, "dependency removed");

    Ok(task.clone())
}

/// Computes whether a task is blocked
///
/// Only direct dependencies count. An ID that no longer resolves to a task
/// is skipped here; [`audit`](super::audit) reports it.
pub fn is_blocked<'a>(task: &Task, tasks: &'a TaskSet) -> BlockingStatus<'a> {
    let blocking = task
        .depends_on
        .iter()
        .filter_map(|dep| tasks.get(dep))
        .filter(|dep| !dep.completed)
        .collect();

    BlockingStatus { blocking }
}

/// Returns every task `task_id` transitively depends on
///
/// Each ID appears after all of its own dependencies (depth-first
/// post-order), duplicates from shared dependencies keep their first
/// position, and `task_id` itself is not included.
pub fn dependency_chain(task_id: TaskId, tasks: &TaskSet) -> Result<Vec<TaskId>, DependencyError> {
    if !tasks.contains(task_id) {
        return Err(DependencyError::TaskNotFound(task_id));
    }

    let mut chain = Vec::new();
    let mut emitted: HashSet<TaskId> = HashSet::from([task_id]);
    // Guards termination on diamonds; the graph is already acyclic
    let mut visited: HashSet<TaskId> = HashSet::from([task_id]);
    let mut stack: Vec<(TaskId, usize)> = vec![(task_id, 0)];

    while let Some(frame) = stack.last_mut() {
        let (node, next_edge) = *frame;

        match tasks.dependencies_of(node).get(next_edge) {
            Some(&dep) => {
                frame.1 += 1;
                if visited.insert(dep) {
                    stack.push((dep, 0));
                }
            }
            None => {
                stack.pop();
                if emitted.insert(node) {
                    chain.push(node);
                }
            }
        }
    }

    Ok(chain)
}

/// Marks a task complete if none of its dependencies are incomplete
///
/// Completing an already completed task returns it unchanged.
pub fn complete_task(task_id: TaskId, tasks: &mut TaskSet) -> Result<Task, DependencyError> {
    let task = tasks
        .get(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;

    if !task.completed {
        let status = is_blocked(task, tasks);
        if status.is_blocked() {
            return Err(DependencyError::BlockedCompletion {
                task: task_id,
                blocking: status.blocking_ids(),
            });
        }
    }

    let task = tasks
        .get_mut(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;
    task.complete();
    debug!(task = %task_id, "task completed");

    Ok(task.clone())
}

/// Marks a task incomplete again
pub fn reopen_task(task_id: TaskId, tasks: &mut TaskSet) -> Result<Task, DependencyError> {
    let task = tasks
        .get_mut(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))?;
    task.reopen();
    debug!(task = %task_id, "task reopened");

    Ok(task.clone())
}

/// Removes a task from the set
///
/// A task other tasks still depend on is only removed with `force`, in
/// which case its ID is first stripped from every dependent so no reference
/// is left dangling.
pub fn detach_task(task_id: TaskId, tasks: &mut TaskSet, force: bool) -> Result<Task, DependencyError> {
    if !tasks.contains(task_id) {
        return Err(DependencyError::TaskNotFound(task_id));
    }

    let dependents = tasks.dependents(task_id);
    if !dependents.is_empty() {
        if !force {
            return Err(DependencyError::HasDependents {
                task: task_id,
                dependents,
            });
        }

        for dependent in &dependents {
            if let Some(task) = tasks.get_mut(*dependent) {
                task.drop_dependency(task_id);
            }
        }
        debug!(task = %task_id, dependents = %join_ids(&dependents, ", "), "stripped edges before removal");
    }

    tasks
        .remove(task_id)
        .ok_or(DependencyError::TaskNotFound(task_id))
}
