//! Domain models for taskdeps
//!
//! Contains the task model and the dependency graph engine, without any
//! I/O concerns.

mod id;
mod task;
mod task_set;
mod cycle;
mod graph;
mod audit;

pub use id::{join_ids, IdError, TaskId};
pub use task::{Dependencies, Task};
pub use task_set::TaskSet;
pub use cycle::CyclePath;
pub use graph::{
    add_dependency, complete_task, dependency_chain, detach_task, is_blocked, remove_dependency,
    reopen_task, validate_dependencies, BlockingStatus, DependencyError,
};
pub use audit::{audit, completion_order, IntegrityIssue};
