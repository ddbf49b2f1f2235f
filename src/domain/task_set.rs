//! The collection of tasks the dependency engine operates on
//!
//! A [`TaskSet`] is a snapshot owned by the host for the duration of one
//! engine call. Lookups are O(1); iteration is always in ID order so that
//! every traversal built on top of it is deterministic.

use std::collections::HashMap;

use super::graph::DependencyError;
use super::id::TaskId;
use super::task::Task;

/// Mapping from task ID to task
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSet {
    tasks: HashMap<TaskId, Task>,
}

impl TaskSet {
    /// Creates an empty task set
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Inserts a task, replacing and returning any task with the same ID
    pub fn insert(&mut self, task: Task) -> Option<Task> {
        self.tasks.insert(task.id, task)
    }

    /// Returns the task with the given ID
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Returns a mutable reference to the task with the given ID
    pub(crate) fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    /// Removes a task without touching edges that point at it
    pub(crate) fn remove(&mut self, id: TaskId) -> Option<Task> {
        self.tasks.remove(&id)
    }

    /// Returns true if a task with this ID exists
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Returns the number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if there are no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns all task IDs in ascending order
    pub fn ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<_> = self.tasks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterates over tasks in ascending ID order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        let mut tasks: Vec<_> = self.tasks.values().collect();
        tasks.sort_by_key(|t| t.id);
        tasks.into_iter()
    }

    /// Returns the ID the next created task should get
    ///
    /// Fails once the highest ID in the set is `u64::MAX`; reusing it would
    /// replace an existing task.
    pub fn next_id(&self) -> Result<TaskId, DependencyError> {
        match self.tasks.keys().max() {
            Some(&max) => max.next().ok_or(DependencyError::IdsExhausted(max)),
            None => Ok(TaskId::first()),
        }
    }

    /// Returns the direct dependencies of a task, empty if the task is unknown
    pub fn dependencies_of(&self, id: TaskId) -> &[TaskId] {
        self.tasks
            .get(&id)
            .map(|t| t.depends_on.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the tasks that directly depend on `id`, in ID order
    pub fn dependents(&self, id: TaskId) -> Vec<TaskId> {
        self.iter()
            .filter(|t| t.depends_on.contains(id))
            .map(|t| t.id)
            .collect()
    }
}

impl FromIterator<Task> for TaskSet {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        let mut set = Self::new();
        for task in iter {
            set.insert(task);
        }
        set
    }
}

impl IntoIterator for TaskSet {
    type Item = Task;
    type IntoIter = std::vec::IntoIter<Task>;

    /// Consumes the set, yielding tasks in ascending ID order
    fn into_iter(self) -> Self::IntoIter {
        let mut tasks: Vec<_> = self.tasks.into_values().collect();
        tasks.sort_by_key(|t| t.id);
        tasks.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> TaskId {
        TaskId::new(n).unwrap()
    }

    fn set_of(ids: &[u64]) -> TaskSet {
        ids.iter()
            .map(|&n| Task::new(id(n), format!("Task {}", n)))
            .collect()
    }

    #[test]
    fn empty_set() {
        let set = TaskSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.next_id(), Ok(TaskId::first()));
    }

    #[test]
    fn next_id_follows_maximum() {
        let set = set_of(&[1, 7, 3]);
        assert_eq!(set.next_id(), Ok(id(8)));
    }

    #[test]
    fn next_id_exhausted_at_maximum() {
        let mut set = set_of(&[1]);
        set.insert(Task::new(id(u64::MAX), "Last"));

        assert_eq!(
            set.next_id(),
            Err(DependencyError::IdsExhausted(id(u64::MAX)))
        );
    }

    #[test]
    fn iteration_is_sorted() {
        let set = set_of(&[5, 2, 9, 1]);
        let order: Vec<_> = set.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![id(1), id(2), id(5), id(9)]);
        assert_eq!(set.ids(), order);
    }

    #[test]
    fn dependents_are_reverse_edges() {
        let mut set = set_of(&[1, 2, 3]);
        set.get_mut(id(2)).unwrap().push_dependency(id(1));
        set.get_mut(id(3)).unwrap().push_dependency(id(1));

        assert_eq!(set.dependents(id(1)), vec![id(2), id(3)]);
        assert!(set.dependents(id(3)).is_empty());
    }

    #[test]
    fn dependencies_of_unknown_task_is_empty() {
        let set = set_of(&[1]);
        assert!(set.dependencies_of(id(42)).is_empty());
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut set = set_of(&[1]);
        let previous = set.insert(Task::new(id(1), "Renamed"));
        assert_eq!(previous.map(|t| t.title), Some("Task 1".to_string()));
        assert_eq!(set.get(id(1)).map(|t| t.title.as_str()), Some("Renamed"));
        assert_eq!(set.len(), 1);
    }
}
