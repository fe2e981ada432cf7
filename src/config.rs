//! Configuration loading and management
//!
//! Handles parsing of `.agesched.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aging::{Aging, AgingDirection, DEFAULT_AGING_DIVISOR};
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".agesched.toml";
const USER_CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Aging configuration
    #[serde(default)]
    pub aging: AgingConfig,

    /// Undo/redo history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Task admission rules
    #[serde(default)]
    pub tasks: TasksConfig,
}

/// Aging-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingConfig {
    /// Waiting-time units per step of effective priority
    #[serde(default = "default_divisor")]
    pub divisor: u64,

    /// Whether waiting lowers (penalize) or raises (boost) priority
    #[serde(default)]
    pub direction: AgingDirection,

    /// Wall-clock milliseconds per tick unit for elapsed aging
    #[serde(default = "default_tick_unit_ms")]
    pub tick_unit_ms: u64,
}

fn default_divisor() -> u64 {
    DEFAULT_AGING_DIVISOR
}

fn default_tick_unit_ms() -> u64 {
    1000
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            divisor: default_divisor(),
            direction: AgingDirection::default(),
            tick_unit_ms: default_tick_unit_ms(),
        }
    }
}

impl AgingConfig {
    pub fn aging(&self) -> Result<Aging> {
        Aging::new(self.divisor, self.direction)
    }
}

/// Undo/redo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Record snapshots after each mutation
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of undo snapshots kept (unbounded when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: None,
        }
    }
}

/// Task admission configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Reject adding a task whose name is already active
    #[serde(default = "default_true")]
    pub reject_duplicate_names: bool,

    /// Accept priorities below zero
    #[serde(default = "default_true")]
    pub allow_negative_priority: bool,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_names: true,
            allow_negative_priority: true,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration for a run.
    ///
    /// An explicit path must load. Otherwise `.agesched.toml` in `dir`, then
    /// the per-user config file, then defaults; unreadable discovered files
    /// fall back to defaults with a warning.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = [Some(dir.join(CONFIG_FILE_NAME)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            return Ok(Self::load(&path).unwrap_or_else(|err| {
                warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }));
        }
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.aging.aging()?;
        if self.aging.tick_unit_ms == 0 {
            return Err(Error::InvalidConfig("aging.tick_unit_ms must be >= 1".to_string()));
        }
        if let Some(depth) = self.history.max_depth {
            if depth < 2 {
                return Err(Error::InvalidConfig("history.max_depth must be >= 2".to_string()));
            }
        }
        Ok(())
    }
}

/// Per-user config file location, e.g. `~/.config/agesched/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "agesched")
        .map(|dirs| dirs.config_dir().join(USER_CONFIG_FILE_NAME))
}
