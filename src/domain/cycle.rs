//! Cycle detection with a reportable path
//!
//! When a task `origin` proposes a new dependency `candidate`, the edge
//! `origin -> candidate` closes a cycle exactly when `origin` is already
//! reachable from `candidate`. The search below walks the proposed graph
//! (current edges plus the tentative one) depth-first from `candidate`.
//!
//! Two sets drive the walk:
//! - `on_stack`: nodes on the current search path. Meeting one again is a
//!   genuine cycle.
//! - `explored`: nodes whose whole subtree has been searched without
//!   reaching `origin`. Meeting one again is skipped, which keeps diamonds
//!   linear.
//!
//! The walk uses an explicit stack of frames, so deep chains cannot
//! overflow the call stack. Each call is O(V+E).

use std::collections::HashSet;
use std::fmt;

use super::id::TaskId;
use super::task_set::TaskSet;

/// The concrete sequence of task IDs forming a cycle
///
/// The first and last entries are the same node. For a cycle closed by a
/// proposed edge, that node is the task the edge starts from:
/// `[origin, candidate, ..., origin]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath(Vec<TaskId>);

impl CyclePath {
    pub(crate) fn new(nodes: Vec<TaskId>) -> Self {
        Self(nodes)
    }

    /// The nodes in traversal order, first node repeated at the end
    pub fn nodes(&self) -> &[TaskId] {
        &self.0
    }

    /// Number of distinct tasks in the cycle
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the task takes part in the cycle
    pub fn contains(&self, id: TaskId) -> bool {
        self.0.contains(&id)
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<_> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(" → "))
    }
}

/// A task set with one task's edges replaced by a proposed edge list
pub(crate) struct ProposedGraph<'a> {
    tasks: &'a TaskSet,
    origin: TaskId,
    origin_edges: Vec<TaskId>,
}

impl<'a> ProposedGraph<'a> {
    /// The current graph plus the tentative edge `origin -> candidate`
    pub(crate) fn with_edge(tasks: &'a TaskSet, origin: TaskId, candidate: TaskId) -> Self {
        let mut origin_edges = tasks.dependencies_of(origin).to_vec();
        if !origin_edges.contains(&candidate) {
            origin_edges.push(candidate);
        }

        Self {
            tasks,
            origin,
            origin_edges,
        }
    }

    fn edges(&self, node: TaskId) -> &[TaskId] {
        if node == self.origin {
            &self.origin_edges
        } else {
            self.tasks.dependencies_of(node)
        }
    }

    /// Searches for a path from `candidate` back to the origin
    ///
    /// Returns the full cycle `[origin, candidate, ..., origin]` if the
    /// tentative edge closes one. If the walk instead runs into a cycle that
    /// already exists and avoids the origin (only possible with corrupt
    /// input), that cycle is returned, starting and ending at the revisited
    /// node.
    pub(crate) fn find_cycle_through(&self, candidate: TaskId) -> Option<CyclePath> {
        let target = self.origin;

        if candidate == target {
            return Some(CyclePath::new(vec![target, target]));
        }

        let mut on_stack: HashSet<TaskId> = HashSet::from([candidate]);
        let mut explored: HashSet<TaskId> = HashSet::new();
        // Each frame is (node, index of the next edge to follow)
        let mut stack: Vec<(TaskId, usize)> = vec![(candidate, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next_edge) = *frame;

            let Some(&next) = self.edges(node).get(next_edge) else {
                stack.pop();
                on_stack.remove(&node);
                explored.insert(node);
                continue;
            };
            frame.1 += 1;

            if next == target {
                let mut path = Vec::with_capacity(stack.len() + 2);
                path.push(target);
                path.extend(stack.iter().map(|(n, _)| *n));
                path.push(target);
                return Some(CyclePath::new(path));
            }

            if on_stack.contains(&next) {
                let start = stack.iter().position(|(n, _)| *n == next).unwrap_or(0);
                let mut path: Vec<_> = stack[start..].iter().map(|(n, _)| *n).collect();
                path.push(next);
                return Some(CyclePath::new(path));
            }

            if explored.contains(&next) {
                continue;
            }

            on_stack.insert(next);
            stack.push((next, 0));
        }

        None
    }
}
