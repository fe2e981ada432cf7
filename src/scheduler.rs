//! Scheduler facade: the command surface callers drive.
//!
//! Validates input against [`TasksConfig`], applies the operation to the
//! queue and, when history is enabled, records the resulting state. Calls
//! that change nothing (empty extraction, unknown name, zero elapsed units)
//! record nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::aging::ElapsedClock;
use crate::config::{Config, TasksConfig};
use crate::error::{Error, Result};
use crate::queue::AgingPriorityQueue;
use crate::task::{Task, TaskHandle};
use crate::undo::HistoryManager;

/// Executions performed by [`Scheduler::run_next`] when no limit is given.
pub const DEFAULT_RUN_LIMIT: usize = 10;

/// A task as reported to callers, with its computed effective priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub base_priority: i64,
    pub effective_priority: i64,
    pub waiting_time: u64,
    pub insertion_order: u64,
    pub completed: bool,
}

/// Active tasks in service order, then completed tasks in completion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub active: Vec<TaskView>,
    pub completed: Vec<TaskView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerStats {
    pub active: usize,
    pub completed: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: AgingPriorityQueue,
    history: Option<HistoryManager>,
    clock: ElapsedClock,
    admission: TasksConfig,
}

impl Scheduler {
    pub fn new(config: &Config) -> Result<Self> {
        Self::new_at(config, Utc::now())
    }

    /// Build a scheduler whose elapsed-time clock starts at `started_at`.
    pub fn new_at(config: &Config, started_at: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        let history = config
            .history
            .enabled
            .then(|| HistoryManager::with_max_depth(config.history.max_depth));
        Ok(Self {
            queue: AgingPriorityQueue::new(config.aging.aging()?),
            history,
            clock: ElapsedClock::new(config.aging.tick_unit_ms, started_at)?,
            admission: config.tasks.clone(),
        })
    }

    pub fn add_task(&mut self, name: &str, description: &str, priority: i64) -> Result<TaskHandle> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("task name cannot be empty".to_string()));
        }
        self.check_priority(priority)?;
        if self.admission.reject_duplicate_names && self.queue.contains(name) {
            return Err(Error::DuplicateTask(name.to_string()));
        }

        let handle = self.queue.insert(name, description.trim(), priority)?;
        self.record();
        Ok(handle)
    }

    /// Remove and return the next task to run.
    pub fn get_next_task(&mut self) -> Option<Task> {
        let task = self.queue.extract_max()?;
        self.record();
        Some(task)
    }

    /// Execute up to `limit` tasks, aging the ones left waiting by one unit
    /// after each execution. Each execution is recorded as one state.
    pub fn run_next(&mut self, limit: usize) -> Vec<TaskView> {
        let mut executed = Vec::new();
        for _ in 0..limit {
            let Some(task) = self.queue.extract_max() else {
                break;
            };
            executed.push(self.view(&task));
            self.queue.age_tick(1);
            self.record();
        }
        debug!(executed = executed.len(), limit, "run next");
        executed
    }

    pub fn peek_next_task(&self) -> Option<TaskView> {
        self.queue.peek_max().map(|task| self.view(task))
    }

    /// Advance every active task's waiting time by one unit.
    pub fn age_tick(&mut self) {
        self.age_by(1);
    }

    pub fn age_by(&mut self, increment: u64) {
        self.queue.age_tick(increment);
        self.record();
    }

    /// Age by the wall-clock time since the previous elapsed tick.
    pub fn age_elapsed(&mut self) -> u64 {
        self.age_elapsed_at(Utc::now())
    }

    pub fn age_elapsed_at(&mut self, now: DateTime<Utc>) -> u64 {
        let units = self.clock.advance(now);
        debug!(units, "elapsed aging sample");
        if units > 0 {
            self.age_by(units);
        }
        units
    }

    pub fn adjust_priority(&mut self, name: &str, priority: i64) -> Result<TaskView> {
        self.check_priority(priority)?;
        let task = self.queue.set_priority(name.trim(), priority)?;
        self.record();
        Ok(self.view(&task))
    }

    pub fn mark_completed(&mut self, name: &str) -> Result<TaskView> {
        let task = self.queue.mark_completed(name.trim())?;
        self.record();
        Ok(self.view(&task))
    }

    pub fn list_all(&self) -> Listing {
        Listing {
            active: self
                .queue
                .active_tasks()
                .into_iter()
                .map(|task| self.view(task))
                .collect(),
            completed: self
                .queue
                .completed_tasks()
                .iter()
                .map(|task| self.view(task))
                .collect(),
        }
    }

    pub fn undo(&mut self) -> Result<()> {
        let history = self.history.as_mut().ok_or(Error::HistoryDisabled)?;
        history.undo(&mut self.queue)
    }

    pub fn redo(&mut self) -> Result<()> {
        let history = self.history.as_mut().ok_or(Error::HistoryDisabled)?;
        history.redo(&mut self.queue)
    }

    pub fn stats(&self) -> SchedulerStats {
        let (undo_depth, redo_depth) = self
            .history
            .as_ref()
            .map(|history| (history.undo_depth(), history.redo_depth()))
            .unwrap_or((0, 0));
        SchedulerStats {
            active: self.queue.len(),
            completed: self.queue.completed_len(),
            undo_depth,
            redo_depth,
        }
    }

    pub fn queue(&self) -> &AgingPriorityQueue {
        &self.queue
    }

    pub fn history(&self) -> Option<&HistoryManager> {
        self.history.as_ref()
    }

    pub fn view(&self, task: &Task) -> TaskView {
        TaskView {
            name: task.name().to_string(),
            description: task.description().to_string(),
            base_priority: task.base_priority(),
            effective_priority: self.queue.effective_priority(task),
            waiting_time: task.waiting_time(),
            insertion_order: task.insertion_order(),
            completed: task.is_completed(),
        }
    }

    fn check_priority(&self, priority: i64) -> Result<()> {
        if priority < 0 && !self.admission.allow_negative_priority {
            return Err(Error::InvalidInput(format!(
                "priority must be >= 0 (got {priority})"
            )));
        }
        Ok(())
    }

    fn record(&mut self) {
        if let Some(history) = self.history.as_mut() {
            history.record_state(self.queue.snapshot());
        }
    }
}
