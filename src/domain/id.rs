//! Task identifiers
//!
//! ID Format:
//! - Stored form: a positive integer (`3`)
//! - Display form: `#3`
//! - Parsing accepts both `3` and `#3`
//!
//! Zero is reserved and never a valid ID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID: expected a positive integer like '3' or '#3', got '{0}'")]
    InvalidTaskId(String),

    #[error("Task ID must be positive, got 0")]
    Zero,
}

/// Task ID, unique within a task set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TaskId(u64);

impl TaskId {
    /// Creates a task ID, rejecting zero
    pub fn new(value: u64) -> Result<Self, IdError> {
        if value == 0 {
            return Err(IdError::Zero);
        }
        Ok(Self(value))
    }

    /// The first ID handed out in an empty task set
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the raw integer value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the ID that follows this one, or `None` at `u64::MAX`
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);

        let value: u64 = digits
            .parse()
            .map_err(|_| IdError::InvalidTaskId(s.to_string()))?;

        Self::new(value)
    }
}

impl TryFrom<u64> for TaskId {
    type Error = IdError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for u64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

/// Renders a list of IDs joined by `sep` (e.g. `#1, #2`)
pub fn join_ids(ids: &[TaskId], sep: &str) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}
