//! Whole-graph integrity checks
//!
//! The engine keeps a task set valid one mutation at a time. Task files can
//! still be edited by hand, so this module re-derives the graph with petgraph
//! and reports every invariant violation it finds, independently of the
//! engine's own search.

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use super::cycle::{CyclePath, ProposedGraph};
use super::graph::{is_blocked, DependencyError};
use super::id::{join_ids, TaskId};
use super::task_set::TaskSet;

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// A task lists itself as a dependency
    SelfLoop { task: TaskId },

    /// A task depends on an ID that is not in the set
    MissingDependency { task: TaskId, dependency: TaskId },

    /// Tasks that reach each other through dependencies (sorted by ID)
    Cycle { tasks: Vec<TaskId> },

    /// A completed task with dependencies that are not complete
    CompletedWhileBlocked { task: TaskId, blocking: Vec<TaskId> },
}

impl IntegrityIssue {
    /// Returns true for issues the engine itself can produce
    ///
    /// Reopening a dependency of a completed task is allowed, so
    /// `CompletedWhileBlocked` is reported but does not make the set invalid.
    pub fn is_warning(&self) -> bool {
        matches!(self, IntegrityIssue::CompletedWhileBlocked { .. })
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::SelfLoop { task } => write!(f, "{} depends on itself", task),
            IntegrityIssue::MissingDependency { task, dependency } => {
                write!(f, "{} depends on missing task {}", task, dependency)
            }
            IntegrityIssue::Cycle { tasks } => {
                write!(f, "dependency cycle between {}", join_ids(tasks, ", "))
            }
            IntegrityIssue::CompletedWhileBlocked { task, blocking } => write!(
                f,
                "{} is completed but depends on incomplete {}",
                task,
                join_ids(blocking, ", ")
            ),
        }
    }
}

/// Builds a petgraph view with an edge `dependency -> task` for every
/// resolvable, non-self edge. Nodes are added in ID order.
fn build_graph(tasks: &TaskSet) -> DiGraph<TaskId, ()> {
    let mut graph = DiGraph::new();
    let mut node_map: HashMap<TaskId, NodeIndex> = HashMap::new();

    for id in tasks.ids() {
        node_map.insert(id, graph.add_node(id));
    }

    for task in tasks.iter() {
        let task_idx = node_map[&task.id];
        for dep in task.depends_on.iter() {
            if dep == task.id {
                continue;
            }
            if let Some(&dep_idx) = node_map.get(&dep) {
                graph.add_edge(dep_idx, task_idx, ());
            }
        }
    }

    graph
}

/// Reports every invariant violation in the task set
///
/// Issues are grouped by kind: self-loops, missing dependencies, cycles,
/// then completed-while-blocked tasks, each in ID order.
pub fn audit(tasks: &TaskSet) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    for task in tasks.iter() {
        if task.depends_on.contains(task.id) {
            issues.push(IntegrityIssue::SelfLoop { task: task.id });
        }
    }

    for task in tasks.iter() {
        for dep in task.depends_on.iter() {
            if !tasks.contains(dep) {
                issues.push(IntegrityIssue::MissingDependency {
                    task: task.id,
                    dependency: dep,
                });
            }
        }
    }

    let graph = build_graph(tasks);
    let mut cycles: Vec<Vec<TaskId>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut ids: Vec<_> = component.into_iter().map(|idx| graph[idx]).collect();
            ids.sort_unstable();
            ids
        })
        .collect();
    cycles.sort();
    issues.extend(cycles.into_iter().map(|tasks| IntegrityIssue::Cycle { tasks }));

    for task in tasks.iter().filter(|t| t.completed) {
        let status = is_blocked(task, tasks);
        if status.is_blocked() {
            issues.push(IntegrityIssue::CompletedWhileBlocked {
                task: task.id,
                blocking: status.blocking_ids(),
            });
        }
    }

    issues
}

/// Orders the whole task set so that every task follows its dependencies
///
/// Fails with [`DependencyError::CircularDependency`] naming one concrete
/// cycle if the set is not acyclic.
pub fn completion_order(tasks: &TaskSet) -> Result<Vec<TaskId>, DependencyError> {
    let graph = build_graph(tasks);

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|idx| graph[idx]).collect()),
        Err(cycle) => {
            let node = graph[cycle.node_id()];
            Err(DependencyError::CircularDependency(cycle_at(tasks, node)))
        }
    }
}

/// Recovers a concrete cycle through `node`, which petgraph reported as cyclic
fn cycle_at(tasks: &TaskSet, node: TaskId) -> CyclePath {
    tasks
        .dependencies_of(node)
        .iter()
        .find_map(|&dep| ProposedGraph::with_edge(tasks, node, dep).find_cycle_through(dep))
        .unwrap_or_else(|| CyclePath::new(vec![node, node]))
}
