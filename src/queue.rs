//! Aging priority queue.
//!
//! Active tasks live in a binary max-heap whose comparator computes effective
//! priority from each task's base priority and waiting time at comparison
//! time. Any operation that can change a key (aging, re-prioritising,
//! completing) drains the heap into a fresh one and swaps it in; there is no
//! in-place sift because a tick moves every key at once.
//!
//! Completed tasks leave the heap and are kept in completion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aging::Aging;
use crate::error::{Error, Result};
use crate::task::{Task, TaskHandle};

#[derive(Debug, Clone)]
struct Entry {
    task: Task,
    aging: Aging,
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.aging.compare(&self.task, &other.task)
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Deep copy of the queue's full state.
///
/// Active tasks are stored in service order so equal queues produce equal
/// states regardless of heap layout. The insertion counter is not part of
/// the state; it belongs to the live queue and only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    active: Vec<Task>,
    completed: Vec<Task>,
}

impl QueueState {
    pub fn active(&self) -> &[Task] {
        &self.active
    }

    pub fn completed(&self) -> &[Task] {
        &self.completed
    }
}

#[derive(Debug, Clone)]
pub struct AgingPriorityQueue {
    heap: BinaryHeap<Entry>,
    completed: Vec<Task>,
    next_order: u64,
    aging: Aging,
}

impl Default for AgingPriorityQueue {
    fn default() -> Self {
        Self::new(Aging::default())
    }
}

impl AgingPriorityQueue {
    pub fn new(aging: Aging) -> Self {
        Self {
            heap: BinaryHeap::new(),
            completed: Vec::new(),
            next_order: 0,
            aging,
        }
    }

    pub fn aging(&self) -> Aging {
        self.aging
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn completed_len(&self) -> usize {
        self.completed.len()
    }

    pub fn effective_priority(&self, task: &Task) -> i64 {
        self.aging.effective_priority(task)
    }

    /// Add a task with zero waiting time and the next insertion order.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        base_priority: i64,
    ) -> Result<TaskHandle> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("task name cannot be empty".to_string()));
        }

        let order = self.next_order;
        self.next_order += 1;
        let task = Task::new(name, description, base_priority, order);
        let handle = task.handle();
        debug!(name = task.name(), priority = base_priority, order, "insert");
        self.heap.push(Entry {
            task,
            aging: self.aging,
        });
        Ok(handle)
    }

    pub fn peek_max(&self) -> Option<&Task> {
        self.heap.peek().map(|entry| &entry.task)
    }

    pub fn extract_max(&mut self) -> Option<Task> {
        let task = self.heap.pop().map(|entry| entry.task)?;
        debug!(name = task.name(), remaining = self.heap.len(), "extract");
        Some(task)
    }

    /// Add `increment` to every active task's waiting time and reorder.
    pub fn age_tick(&mut self, increment: u64) {
        self.rebuild(|task| task.add_waiting_time(increment));
        debug!(increment, active = self.heap.len(), "age tick");
    }

    /// Overwrite the base priority of the first active task named `name`.
    pub fn set_priority(&mut self, name: &str, priority: i64) -> Result<Task> {
        let order = self
            .first_match(name)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))?;

        let mut updated = None;
        self.rebuild(|task| {
            if task.insertion_order() == order {
                task.set_base_priority(priority);
                updated = Some(task.clone());
            }
        });
        debug!(name, priority, "set priority");
        updated.ok_or_else(|| Error::TaskNotFound(name.to_string()))
    }

    /// Move the first active task named `name` to the completed list.
    pub fn mark_completed(&mut self, name: &str) -> Result<Task> {
        let order = self
            .first_match(name)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))?;

        let (mut done, remaining): (Vec<Entry>, Vec<Entry>) = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .partition(|entry| entry.task.insertion_order() == order);
        self.heap = remaining.into_iter().collect();

        let mut task = done
            .pop()
            .map(|entry| entry.task)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))?;
        task.mark_completed();
        self.completed.push(task.clone());
        debug!(name, completed = self.completed.len(), "mark completed");
        Ok(task)
    }

    /// Active tasks in service order.
    pub fn active_tasks(&self) -> Vec<&Task> {
        let mut entries: Vec<&Entry> = self.heap.iter().collect();
        entries.sort_by(|left, right| right.cmp(left));
        entries.into_iter().map(|entry| &entry.task).collect()
    }

    /// Completed tasks in completion order.
    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed
    }

    /// First active task named `name` in service order.
    pub fn find(&self, name: &str) -> Option<&Task> {
        self.heap
            .iter()
            .filter(|entry| entry.task.name() == name)
            .max()
            .map(|entry| &entry.task)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.heap.iter().any(|entry| entry.task.name() == name)
    }

    pub fn snapshot(&self) -> QueueState {
        QueueState {
            active: self.active_tasks().into_iter().cloned().collect(),
            completed: self.completed.clone(),
        }
    }

    /// Replace active and completed tasks with `state`.
    ///
    /// The insertion counter is left alone so orders handed out after the
    /// snapshot was taken are not reused.
    pub fn restore(&mut self, state: &QueueState) {
        let aging = self.aging;
        self.heap = state
            .active
            .iter()
            .cloned()
            .map(|task| Entry { task, aging })
            .collect();
        self.completed = state.completed.clone();
        debug!(
            active = self.heap.len(),
            completed = self.completed.len(),
            "restore"
        );
    }

    fn first_match(&self, name: &str) -> Option<u64> {
        self.find(name).map(Task::insertion_order)
    }

    fn rebuild(&mut self, mut apply: impl FnMut(&mut Task)) {
        self.heap = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .map(|mut entry| {
                apply(&mut entry.task);
                entry
            })
            .collect();
    }
}
