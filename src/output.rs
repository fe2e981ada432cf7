//! Shared output formatting for agesched CLI commands.
//!
//! JSON output is one compact envelope per line so script runs stream as
//! JSON lines.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};
use crate::scheduler::TaskView;

pub const SCHEMA_VERSION: &str = "agesched.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

/// Report a failure. `line` is the script line that produced it, if any.
pub fn emit_error(command: &str, err: &Error, line: Option<usize>, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            line: Option<usize>,
            error: JsonError,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            line,
            error: JsonError::from(err),
            next_steps,
        };

        println!("{}", serde_json::to_string(&payload)?);
        return Ok(());
    }

    match line {
        Some(line) => eprintln!("error: line {line}: {err}"),
        None => eprintln!("error: {err}"),
    }
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

/// One-line rendering of a task for listings.
pub fn format_task(task: &TaskView) -> String {
    let mut line = format!(
        "{} [priority {}, effective {}, waited {}] #{}",
        task.name,
        task.base_priority,
        task.effective_priority,
        task.waiting_time,
        task.insertion_order
    );
    if !task.description.is_empty() {
        line.push_str(" - ");
        line.push_str(&task.description);
    }
    line
}

pub fn infer_command_name_from_args() -> String {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "agesched".to_string()
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::TaskNotFound(_) => vec!["list".to_string()],
        Error::DuplicateTask(name) => vec![format!("priority {name} <new-priority>")],
        Error::HistoryDisabled => vec!["set history.enabled = true in .agesched.toml".to_string()],
        Error::InvalidConfig(_) | Error::TomlParse(_) => {
            vec!["fix .agesched.toml then retry".to_string()]
        }
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("Task added");
        human.push_summary("Name", "build");
        human.push_summary("Queued", "");
        human.push_detail("one");
        human.push_warning("careful");

        let text = format_human(&human);
        assert_eq!(
            text,
            "Task added\n\nSummary:\n- Name: build\n- Queued\n\nDetails:\n- one\n\nWarnings:\n- careful"
        );
    }

    #[test]
    fn task_line_includes_description_when_present() {
        let mut task = TaskView {
            name: "build".to_string(),
            description: String::new(),
            base_priority: 5,
            effective_priority: 4,
            waiting_time: 10,
            insertion_order: 0,
            completed: false,
        };
        assert_eq!(format_task(&task), "build [priority 5, effective 4, waited 10] #0");

        task.description = "compile".to_string();
        assert!(format_task(&task).ends_with(" - compile"));
    }
}
