//! JSONL storage for tasks
//!
//! Tasks are stored in `.taskdeps/tasks.jsonl` with one JSON object per
//! line, sorted by ID. Reads take a shared lock on the data file; every
//! mutation runs inside [`TaskStore::transaction`], which holds an exclusive
//! lock on `tasks.lock` for the whole load-validate-write cycle.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::debug;

use crate::domain::{Task, TaskSet};

/// Store for task data in JSONL format
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Creates a new task store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".taskdeps").join("tasks.jsonl"))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the lock file guarding write transactions
    pub fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Reads all tasks from the store
    pub fn read_all(&self) -> Result<TaskSet> {
        if !self.path.exists() {
            return Ok(TaskSet::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open task store: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on task store")?;

        let reader = BufReader::new(&file);
        let mut tasks = TaskSet::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let task: Task = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse task at line {}", line_num + 1))?;

            if let Some(previous) = tasks.insert(task) {
                anyhow::bail!(
                    "Duplicate task {} at line {} in {}",
                    previous.id,
                    line_num + 1,
                    self.path.display()
                );
            }
        }

        debug!(count = tasks.len(), path = %self.path.display(), "loaded tasks");

        // Lock is released when file is dropped
        Ok(tasks)
    }

    /// Writes all tasks to the store (full rewrite)
    pub fn write_all(&self, tasks: &TaskSet) -> Result<()> {
        self.ensure_parent()?;

        // Write to temp file first
        let temp_path = self.path.with_extension("jsonl.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on task store")?;

            let mut writer = BufWriter::new(&file);

            for task in tasks.iter() {
                let line = serde_json::to_string(task).context("Failed to serialize task")?;
                writeln!(writer, "{}", line).context("Failed to write task")?;
            }

            writer.flush().context("Failed to flush task store")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        debug!(count = tasks.len(), path = %self.path.display(), "wrote tasks");

        Ok(())
    }

    /// Runs a read-modify-write cycle under an exclusive lock
    ///
    /// The closure sees a fresh snapshot of every task. Its changes are
    /// persisted only if it returns `Ok`; on error the file is untouched and
    /// the error is passed through.
    pub fn transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TaskSet) -> Result<T>,
    {
        self.ensure_parent()?;

        let lock_path = self.lock_path();
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        lock.lock_exclusive()
            .context("Failed to acquire transaction lock on task store")?;

        let mut tasks = self.read_all()?;
        let value = f(&mut tasks)?;
        self.write_all(&tasks)?;

        // Lock is released when `lock` is dropped
        Ok(value)
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}
