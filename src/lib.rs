//! agesched - Aging Priority Task Scheduler Library
//!
//! This library provides the core of the agesched CLI: a priority queue whose
//! ordering key drifts with waiting time, plus snapshot-based undo/redo.
//!
//! # Core Concepts
//!
//! - **Effective priority**: base priority adjusted by waiting time / divisor
//! - **Age tick**: explicit advance of every active task's waiting time
//! - **Active set**: tasks eligible for extraction; completed tasks move aside
//! - **Snapshot**: owned deep copy of queue state used for undo/redo
//!
//! # Module Organization
//!
//! - `aging`: Aging policy, comparator, and elapsed-time sampling
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.agesched.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output rendering
//! - `queue`: The aging priority queue
//! - `scheduler`: Validating command surface over queue and history
//! - `task`: Task values and handles
//! - `undo`: Undo/redo history manager

pub mod aging;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod queue;
pub mod scheduler;
pub mod task;
pub mod undo;

pub use error::{Error, Result};
pub use queue::{AgingPriorityQueue, QueueState};
pub use scheduler::Scheduler;
pub use task::{Task, TaskHandle};
pub use undo::HistoryManager;
