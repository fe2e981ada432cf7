//! Linear undo/redo over queue snapshots.
//!
//! Basic semantics:
//! - The top of the undo stack is the state after the latest recorded mutation
//! - Recording a new state clears the redo stack
//! - Undo needs at least two recorded states (current plus one prior)
//! - Snapshots are owned copies; nothing aliases the live queue

use tracing::debug;

use crate::error::{Error, Result};
use crate::queue::{AgingPriorityQueue, QueueState};

#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    undo_stack: Vec<QueueState>,
    redo_stack: Vec<QueueState>,
    max_depth: Option<usize>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_depth` undo entries, dropping the oldest first.
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn record_state(&mut self, state: QueueState) {
        self.undo_stack.push(state);
        self.redo_stack.clear();
        if let Some(limit) = self.max_depth {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
        debug!(undo_depth = self.undo_stack.len(), "recorded state");
    }

    pub fn undo(&mut self, queue: &mut AgingPriorityQueue) -> Result<()> {
        if self.undo_stack.len() < 2 {
            return Err(Error::NothingToUndo);
        }
        let current = self.undo_stack.pop().ok_or(Error::NothingToUndo)?;
        let previous = self.undo_stack.last().ok_or(Error::NothingToUndo)?;
        queue.restore(previous);
        self.redo_stack.push(current);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo"
        );
        Ok(())
    }

    pub fn redo(&mut self, queue: &mut AgingPriorityQueue) -> Result<()> {
        let next = self.redo_stack.pop().ok_or(Error::NothingToRedo)?;
        queue.restore(&next);
        self.undo_stack.push(next);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "redo"
        );
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// State recorded after the latest mutation, if any.
    pub fn current(&self) -> Option<&QueueState> {
        self.undo_stack.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(history: &mut HistoryManager, queue: &AgingPriorityQueue) {
        history.record_state(queue.snapshot());
    }

    #[test]
    fn undo_requires_two_states() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::new();
        assert!(matches!(history.undo(&mut queue), Err(Error::NothingToUndo)));

        queue.insert("a", "", 1).unwrap();
        record(&mut history, &queue);
        assert!(!history.can_undo());
        assert!(matches!(history.undo(&mut queue), Err(Error::NothingToUndo)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::new();

        queue.insert("a", "", 1).unwrap();
        record(&mut history, &queue);
        queue.insert("b", "", 5).unwrap();
        record(&mut history, &queue);

        history.undo(&mut queue).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(history.can_redo());

        history.redo(&mut queue).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(history.current(), Some(&queue.snapshot()));
    }

    #[test]
    fn undone_insert_leaves_top_equal_to_queue() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::new();

        queue.insert("a", "", 1).unwrap();
        record(&mut history, &queue);
        queue.insert("b", "", 5).unwrap();
        record(&mut history, &queue);

        history.undo(&mut queue).unwrap();
        assert_eq!(history.current(), Some(&queue.snapshot()));
    }

    #[test]
    fn recording_clears_redo() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::new();

        queue.insert("a", "", 1).unwrap();
        record(&mut history, &queue);
        queue.insert("b", "", 5).unwrap();
        record(&mut history, &queue);
        history.undo(&mut queue).unwrap();

        queue.age_tick(1);
        record(&mut history, &queue);
        assert_eq!(history.redo_depth(), 0);
        assert!(matches!(history.redo(&mut queue), Err(Error::NothingToRedo)));
    }

    #[test]
    fn max_depth_drops_oldest() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::with_max_depth(Some(2));

        for (name, priority) in [("a", 1), ("b", 2), ("c", 3)] {
            queue.insert(name, "", priority).unwrap();
            record(&mut history, &queue);
        }
        assert_eq!(history.undo_depth(), 2);

        history.undo(&mut queue).unwrap();
        assert_eq!(queue.len(), 2);
        assert!(matches!(history.undo(&mut queue), Err(Error::NothingToUndo)));
    }

    #[test]
    fn undo_restores_waiting_times() {
        let mut queue = AgingPriorityQueue::default();
        let mut history = HistoryManager::new();

        queue.insert("a", "", 1).unwrap();
        record(&mut history, &queue);
        queue.age_tick(12);
        record(&mut history, &queue);

        history.undo(&mut queue).unwrap();
        assert_eq!(queue.peek_max().map(|task| task.waiting_time()), Some(0));
    }
}
