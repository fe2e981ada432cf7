//! Command-line interface for agesched
//!
//! This module defines the CLI structure using clap derive macros.
//! Script execution lives in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub mod script;

/// agesched - aging priority task scheduler
///
/// Tasks are served by effective priority, which drifts with accumulated
/// waiting time. Every mutation can be undone and redone.
#[derive(Parser, Debug)]
#[command(name = "agesched")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (defaults to ./.agesched.toml, then the user config)
    #[arg(long, global = true, env = "AGESCHED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format (one envelope per line)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute scheduler commands, one per line, from a file or stdin
    Run {
        /// Script file (reads stdin when omitted)
        script: Option<PathBuf>,

        /// Stop at the first failing line and exit with its code
        #[arg(long)]
        strict: bool,
    },

    /// Show the resolved configuration
    Config {
        /// Also write the resolved configuration to this path
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Run { script, strict } => script::run(script::RunOptions {
                script,
                strict,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Config { write } => run_config(ConfigOptions {
                write,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

struct ConfigOptions {
    write: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
    quiet: bool,
}

fn run_config(options: ConfigOptions) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::resolve(options.config.as_deref(), &cwd)?;

    if let Some(path) = options.write.as_deref() {
        config.save(path)?;
    }

    let mut human = HumanOutput::new("Configuration");
    human.push_summary("Aging divisor", config.aging.divisor.to_string());
    human.push_summary("Aging direction", format!("{:?}", config.aging.direction).to_lowercase());
    human.push_summary("Tick unit (ms)", config.aging.tick_unit_ms.to_string());
    human.push_summary("History", if config.history.enabled { "enabled" } else { "disabled" });
    if let Some(depth) = config.history.max_depth {
        human.push_summary("History depth", depth.to_string());
    }
    human.push_summary(
        "Duplicate names",
        if config.tasks.reject_duplicate_names { "rejected" } else { "allowed" },
    );
    human.push_summary(
        "Negative priorities",
        if config.tasks.allow_negative_priority { "allowed" } else { "rejected" },
    );
    if let Some(path) = options.write.as_deref() {
        human.push_detail(format!("written to {}", path.display()));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "config",
        &config,
        Some(&human),
    )
}
