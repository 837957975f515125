//! Loading simulation inputs.
//!
//! Two formats are accepted:
//! - the line-oriented text format (`ALGORITHM;quantum` header, then one
//!   `id;color;arrival;duration;priority;events` line per task), see [`text`];
//! - a JSON scenario (`{policy, quantum?, max_ticks?, tasks}`), see
//!   [`scenario`].
//!
//! Both produce a [`LoadedConfig`]: the simulator configuration, the task
//! records in file order, and the non-fatal warnings raised while loading.

pub mod scenario;
pub mod text;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;

use crate::policy::UnknownPolicy;
use crate::simulator::SimConfig;
use crate::task::TaskSpec;

pub use scenario::Scenario;
pub use text::parse_text;

/// A problem tied to one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number in the original file.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    /// No header line (file empty, or only blanks and comments).
    Empty,
    /// Malformed `ALGORITHM;quantum` line.
    Header(LineError),
    UnknownPolicy { line: usize, source: UnknownPolicy },
    /// Every malformed task line, in file order.
    Lines(Vec<LineError>),
    DuplicateTaskId { id: String },
    NoTasks,
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Empty => write!(f, "configuration has no header line"),
            Self::Header(err) => write!(f, "invalid header, {err}"),
            Self::UnknownPolicy { line, source } => write!(f, "line {line}: {source}"),
            Self::Lines(errors) => {
                write!(f, "{} invalid task line(s)", errors.len())?;
                for err in errors {
                    write!(f, "\n  - {err}")?;
                }
                Ok(())
            }
            Self::DuplicateTaskId { id } => {
                write!(f, "duplicate task id '{id}' appears more than once")
            }
            Self::NoTasks => write!(f, "configuration defines no tasks"),
            Self::Json(err) => write!(f, "invalid scenario: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Validated simulation input.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub sim: SimConfig,
    pub tasks: Vec<TaskSpec>,
    /// Non-fatal problems (defaults applied, odd colors, skipped events).
    pub warnings: Vec<String>,
}

/// Overview of a loaded configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub policy: String,
    pub quantum: u64,
    pub tasks: usize,
    /// Saturates at `i64::MAX`.
    pub total_duration: i64,
    pub first_arrival: i64,
    pub last_arrival: i64,
    pub warnings: usize,
}

impl LoadedConfig {
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            policy: self.sim.policy.name().to_string(),
            quantum: self.sim.quantum,
            tasks: self.tasks.len(),
            total_duration: self
                .tasks
                .iter()
                .fold(0i64, |acc, t| acc.saturating_add(t.duration)),
            first_arrival: self.tasks.iter().map(|t| t.arrival).min().unwrap_or(0),
            last_arrival: self.tasks.iter().map(|t| t.arrival).max().unwrap_or(0),
            warnings: self.warnings.len(),
        }
    }
}

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (quantum {}): {} tasks, {} ticks of CPU work, arrivals {}..={}",
            self.policy,
            self.quantum,
            self.tasks,
            self.total_duration,
            self.first_arrival,
            self.last_arrival
        )
    }
}

/// Load `path`, choosing the format from the extension (`.json` is a
/// scenario, anything else the text format). Warnings are also logged.
pub fn load_path(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let loaded = if is_json {
        Scenario::from_slice(&bytes)?.into_loaded()?
    } else {
        parse_text(&String::from_utf8_lossy(&bytes))?
    };
    for warning in &loaded.warnings {
        warn!("{}: {warning}", path.display());
    }
    Ok(loaded)
}

/// Reject repeated task ids (after trimming).
pub(crate) fn check_unique_ids(tasks: &[TaskSpec]) -> Result<(), ConfigError> {
    for (idx, task) in tasks.iter().enumerate() {
        let id = task.id.trim();
        if tasks[..idx].iter().any(|t| t.id.trim() == id) {
            return Err(ConfigError::DuplicateTaskId { id: id.to_string() });
        }
    }
    Ok(())
}
