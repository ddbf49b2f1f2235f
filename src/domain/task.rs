//! Task domain model
//!
//! Tasks are units of work that can depend on the completion of other
//! tasks. Only the fields the dependency engine needs carry invariants;
//! everything else is descriptive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::TaskId;

/// The set of tasks a task depends on
///
/// Semantically a set, stored as a sequence so that insertion order is
/// preserved for blocking reports and chain traversal. Duplicates are never
/// kept: inserting an existing ID is a no-op, and duplicates read from disk
/// collapse to their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(Vec<TaskId>);

impl Dependencies {
    /// Creates an empty dependency set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a dependency, returning false if it was already present
    pub fn insert(&mut self, id: TaskId) -> bool {
        if self.0.contains(&id) {
            false
        } else {
            self.0.push(id);
            true
        }
    }

    /// Removes a dependency, returning false if it was absent
    pub fn remove(&mut self, id: TaskId) -> bool {
        let len_before = self.0.len();
        self.0.retain(|d| *d != id);
        self.0.len() != len_before
    }

    /// Checks if a specific task ID is a dependency
    pub fn contains(&self, id: TaskId) -> bool {
        self.0.contains(&id)
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of dependencies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over dependency IDs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.0.iter().copied()
    }

    /// Returns the dependencies as a slice
    pub fn as_slice(&self) -> &[TaskId] {
        &self.0
    }
}

impl FromIterator<TaskId> for Dependencies {
    fn from_iter<I: IntoIterator<Item = TaskId>>(iter: I) -> Self {
        let mut deps = Self::new();
        for id in iter {
            deps.insert(id);
        }
        deps
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a TaskId;
    type IntoIter = std::slice::Iter<'a, TaskId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Dependencies {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dependencies {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<TaskId>::deserialize(deserializer)?;
        let raw_len = raw.len();
        let deps: Dependencies = raw.into_iter().collect();

        if deps.len() != raw_len {
            tracing::warn!(
                collapsed = raw_len - deps.len(),
                "duplicate dependency ids collapsed on load"
            );
        }

        Ok(deps)
    }
}

/// A task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the task has been completed
    #[serde(default)]
    pub completed: bool,

    /// Tasks that must be completed before this one
    #[serde(default, skip_serializing_if = "Dependencies::is_empty")]
    pub depends_on: Dependencies,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was completed (if done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new incomplete task with no dependencies
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            completed: false,
            depends_on: Dependencies::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the task complete
    ///
    /// This does not check dependencies; callers go through
    /// [`complete_task`](super::complete_task) to enforce the blocking gate.
    pub(crate) fn complete(&mut self) {
        if !self.completed {
            let now = Utc::now();
            self.completed = true;
            self.completed_at = Some(now);
            self.updated_at = now;
        }
    }

    /// Marks the task incomplete again
    pub(crate) fn reopen(&mut self) {
        if self.completed {
            self.completed = false;
            self.completed_at = None;
            self.updated_at = Utc::now();
        }
    }

    /// Appends a dependency edge without validation
    pub(crate) fn push_dependency(&mut self, id: TaskId) -> bool {
        let added = self.depends_on.insert(id);
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    /// Removes a dependency edge
    pub(crate) fn drop_dependency(&mut self, id: TaskId) -> bool {
        let removed = self.depends_on.remove(id);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}
