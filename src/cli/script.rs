//! `agesched run`: drive a scheduler from a line-oriented command script.
//!
//! Each non-blank line not starting with `#` is one command:
//!
//! ```text
//! add <name> <priority> [description...]
//! next | peek | list | undo | redo
//! run-next [limit]
//! tick [count] | tick --elapsed
//! priority <name> <priority>
//! complete <name>
//! ```
//!
//! Arguments may be wrapped in double quotes to include spaces.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{emit_error, emit_success, format_task, HumanOutput, OutputOptions};
use crate::scheduler::{Scheduler, SchedulerStats, TaskView, DEFAULT_RUN_LIMIT};

pub struct RunOptions {
    pub script: Option<PathBuf>,
    pub strict: bool,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct ScriptLine {
    #[command(subcommand)]
    command: ScriptCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum ScriptCommand {
    /// Add a task
    Add {
        name: String,
        #[arg(allow_negative_numbers = true)]
        priority: i64,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        description: Vec<String>,
    },
    /// Remove and run the next task
    Next,
    /// Show the next task without removing it
    Peek,
    /// Run up to `limit` tasks, aging the rest after each one
    RunNext { limit: Option<usize> },
    /// Age every active task
    Tick {
        count: Option<u64>,
        /// Age by wall-clock time since the previous elapsed tick
        #[arg(long)]
        elapsed: bool,
    },
    /// Change a task's base priority
    Priority {
        name: String,
        #[arg(allow_negative_numbers = true)]
        priority: i64,
    },
    /// Mark a task completed
    Complete { name: String },
    /// List active then completed tasks
    List,
    Undo,
    Redo,
}

impl ScriptCommand {
    fn name(&self) -> &'static str {
        match self {
            ScriptCommand::Add { .. } => "add",
            ScriptCommand::Next => "next",
            ScriptCommand::Peek => "peek",
            ScriptCommand::RunNext { .. } => "run-next",
            ScriptCommand::Tick { .. } => "tick",
            ScriptCommand::Priority { .. } => "priority",
            ScriptCommand::Complete { .. } => "complete",
            ScriptCommand::List => "list",
            ScriptCommand::Undo => "undo",
            ScriptCommand::Redo => "redo",
        }
    }
}

#[derive(Serialize)]
struct TaskAddedOutput {
    name: String,
    priority: i64,
    insertion_order: u64,
}

#[derive(Serialize)]
struct RunNextOutput {
    executed: Vec<TaskView>,
    remaining: usize,
}

#[derive(Serialize)]
struct TickOutput {
    increment: u64,
    active: usize,
}

#[derive(Serialize)]
struct Summary {
    commands: usize,
    failures: usize,
    #[serde(flatten)]
    stats: SchedulerStats,
}

/// Run a script against a fresh scheduler.
pub fn run(options: RunOptions) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(options.config.as_deref(), &cwd)?;
    let mut scheduler = Scheduler::new(&config)?;
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    let reader: Box<dyn BufRead> = match options.script.as_deref() {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    info!(script = ?options.script, strict = options.strict, "script started");
    let mut executed = 0;
    let mut failures = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        executed += 1;

        let verb = trimmed.split_whitespace().next().unwrap_or("");
        let err = match execute_line(&mut scheduler, trimmed, output) {
            Ok(()) => continue,
            Err(err) => err,
        };
        if !err.is_recoverable() {
            return Err(err);
        }
        failures += 1;
        if options.strict {
            return Err(Error::ScriptFailed {
                line: number,
                source: Box::new(err),
            });
        }
        emit_error(verb, &err, Some(number), options.json)?;
    }
    info!(executed, failures, "script finished");

    if options.json {
        let summary = Summary {
            commands: executed,
            failures,
            stats: scheduler.stats(),
        };
        emit_success(output, "run", &summary, None)?;
    }
    Ok(())
}

/// Parse and execute one script line, emitting its result.
pub fn execute_line(scheduler: &mut Scheduler, line: &str, output: OutputOptions) -> Result<()> {
    let command = parse_line(line)?;
    let name = command.name();
    match command {
        ScriptCommand::Add {
            name: task_name,
            priority,
            description,
        } => {
            let description = description.join(" ");
            let handle = scheduler.add_task(&task_name, &description, priority)?;
            let mut human = HumanOutput::new("Task added successfully.");
            human.push_summary("Name", task_name.trim());
            human.push_summary("Priority", priority.to_string());
            let data = TaskAddedOutput {
                name: task_name.trim().to_string(),
                priority,
                insertion_order: handle.insertion_order(),
            };
            emit_success(output, name, &data, Some(&human))
        }
        ScriptCommand::Next => {
            let task = scheduler.get_next_task().map(|task| scheduler.view(&task));
            let human = match &task {
                Some(task) => HumanOutput::new(format!(
                    "Executing '{}' with priority {}",
                    task.name, task.base_priority
                )),
                None => HumanOutput::new("No more tasks in the queue."),
            };
            emit_success(output, name, &task, Some(&human))
        }
        ScriptCommand::Peek => {
            let task = scheduler.peek_next_task();
            let human = match &task {
                Some(task) => HumanOutput::new(format!("Next: {}", format_task(task))),
                None => HumanOutput::new("No more tasks in the queue."),
            };
            emit_success(output, name, &task, Some(&human))
        }
        ScriptCommand::RunNext { limit } => {
            let limit = limit.unwrap_or(DEFAULT_RUN_LIMIT);
            let executed = scheduler.run_next(limit);
            let remaining = scheduler.stats().active;
            let mut human = HumanOutput::new(format!("Executed {} task(s).", executed.len()));
            human.push_summary("Remaining", remaining.to_string());
            for task in &executed {
                human.push_detail(format!(
                    "Executing '{}' with priority {}",
                    task.name, task.base_priority
                ));
            }
            if executed.len() < limit {
                human.push_detail("No more tasks in the queue.");
            }
            let data = RunNextOutput {
                executed,
                remaining,
            };
            emit_success(output, name, &data, Some(&human))
        }
        ScriptCommand::Tick { count, elapsed } => {
            let increment = match (count, elapsed) {
                (Some(_), true) => {
                    return Err(Error::InvalidInput(
                        "tick takes either a count or --elapsed".to_string(),
                    ))
                }
                (_, true) => scheduler.age_elapsed(),
                (count, false) => {
                    let increment = count.unwrap_or(1);
                    scheduler.age_by(increment);
                    increment
                }
            };
            let data = TickOutput {
                increment,
                active: scheduler.stats().active,
            };
            let mut human = HumanOutput::new("Waiting times updated.");
            human.push_summary("Increment", increment.to_string());
            if elapsed && increment == 0 {
                human.push_warning("less than one tick unit elapsed");
            }
            emit_success(output, name, &data, Some(&human))
        }
        ScriptCommand::Priority {
            name: task_name,
            priority,
        } => {
            let task = scheduler.adjust_priority(&task_name, priority)?;
            let mut human = HumanOutput::new("Priority adjusted.");
            human.push_summary("Name", task.name.clone());
            human.push_summary("Priority", task.base_priority.to_string());
            human.push_summary("Effective", task.effective_priority.to_string());
            emit_success(output, name, &task, Some(&human))
        }
        ScriptCommand::Complete { name: task_name } => {
            let task = scheduler.mark_completed(&task_name)?;
            let mut human = HumanOutput::new("Task marked as completed.");
            human.push_summary("Name", task.name.clone());
            emit_success(output, name, &task, Some(&human))
        }
        ScriptCommand::List => {
            let listing = scheduler.list_all();
            let human = listing_human(&listing.active, &listing.completed);
            emit_success(output, name, &listing, Some(&human))
        }
        ScriptCommand::Undo => {
            scheduler.undo()?;
            let stats = scheduler.stats();
            emit_success(output, name, &stats, Some(&history_human("Undone.", stats)))
        }
        ScriptCommand::Redo => {
            scheduler.redo()?;
            let stats = scheduler.stats();
            emit_success(output, name, &stats, Some(&history_human("Redone.", stats)))
        }
    }
}

fn listing_human(active: &[TaskView], completed: &[TaskView]) -> HumanOutput {
    if active.is_empty() && completed.is_empty() {
        return HumanOutput::new("No tasks in the queue.");
    }
    let mut human = HumanOutput::new("All tasks:");
    human.push_summary("Active", active.len().to_string());
    human.push_summary("Completed", completed.len().to_string());
    for task in active {
        human.push_detail(format_task(task));
    }
    for task in completed {
        human.push_detail(format!("{} (completed)", format_task(task)));
    }
    human
}

fn history_human(header: &str, stats: SchedulerStats) -> HumanOutput {
    let mut human = HumanOutput::new(header);
    human.push_summary("Active", stats.active.to_string());
    human.push_summary("Completed", stats.completed.to_string());
    human
}

fn parse_line(line: &str) -> Result<ScriptCommand> {
    let tokens = split_line(line)?;
    let parsed = ScriptLine::try_parse_from(tokens).map_err(|err| {
        let rendered = err.to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or("unrecognized command")
            .trim_start_matches("error: ")
            .to_string();
        Error::InvalidInput(message)
    })?;
    Ok(parsed.command)
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_line(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            ch => {
                current.push(ch);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(Error::InvalidInput("unterminated quote".to_string()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
