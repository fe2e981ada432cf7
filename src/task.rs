//! Task values held by the scheduler.
//!
//! A task is identified by its name for mutation purposes and by its
//! insertion order for ordering. Waiting time belongs to the queue: only
//! [`crate::queue::AgingPriorityQueue`] advances it.

use serde::{Deserialize, Serialize};

/// Opaque handle returned on insertion; wraps the task's insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn insertion_order(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    base_priority: i64,
    #[serde(default)]
    waiting_time: u64,
    insertion_order: u64,
    #[serde(default)]
    completed: bool,
}

impl Task {
    pub(crate) fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        base_priority: i64,
        insertion_order: u64,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            base_priority,
            waiting_time: 0,
            insertion_order,
            completed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn base_priority(&self) -> i64 {
        self.base_priority
    }

    pub fn waiting_time(&self) -> u64 {
        self.waiting_time
    }

    pub fn insertion_order(&self) -> u64 {
        self.insertion_order
    }

    pub fn handle(&self) -> TaskHandle {
        TaskHandle(self.insertion_order)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn set_base_priority(&mut self, priority: i64) {
        self.base_priority = priority;
    }

    pub(crate) fn add_waiting_time(&mut self, increment: u64) {
        self.waiting_time = self.waiting_time.saturating_add(increment);
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }
}
