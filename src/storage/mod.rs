//! # Storage Layer
//!
//! Persistence for taskdeps. The dependency engine never touches the disk;
//! this layer loads a [`TaskSet`](crate::domain::TaskSet) snapshot, lets the
//! engine decide, and writes the result back.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.taskdeps/tasks.jsonl` |
//! | Config | TOML | `.taskdeps/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - Reads take a shared `fs2` lock on `tasks.jsonl`
//! - Mutations run in [`TaskStore::transaction`], serialized by an exclusive
//!   lock on `tasks.lock`
//! - All writes are atomic (temp file + rename)

mod jsonl;
mod config;
mod project;

pub use jsonl::TaskStore;
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};
