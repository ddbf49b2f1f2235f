//! taskdeps - A local-first task tracker with a cycle-safe dependency graph
//!
//! Tasks can depend on other tasks. The [`domain`] module holds the
//! dependency engine, which keeps the graph acyclic, computes blocked status
//! and resolves completion chains. [`storage`] persists tasks as JSONL and
//! [`cli`] exposes everything as the `taskdeps` command.

pub mod domain;
pub mod storage;
pub mod cli;
mod logging;

pub use domain::{DependencyError, Task, TaskId, TaskSet};
