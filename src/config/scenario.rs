//! JSON scenario format.
//!
//! ```json
//! {
//!   "policy": "SRTF",
//!   "max_ticks": 100,
//!   "tasks": [
//!     { "id": "T1", "arrival": 0, "duration": 4,
//!       "events": [{ "offset": 2, "kind": "io", "duration": 3 }] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{check_unique_ids, ConfigError, LoadedConfig, LineError};
use crate::policy::PolicyKind;
use crate::simulator::{SimConfig, DEFAULT_QUANTUM};
use crate::task::{Task, TaskSpec};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub policy: PolicyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,
    pub tasks: Vec<TaskSpec>,
}

impl Scenario {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn sim_config(&self) -> SimConfig {
        let mut cfg = SimConfig::new(self.policy);
        cfg.quantum = self.quantum.unwrap_or(DEFAULT_QUANTUM);
        cfg.max_ticks = self.max_ticks;
        cfg
    }

    /// Validate the task records the same way the text loader does.
    ///
    /// Task errors are reported with the 1-based position of the task in the
    /// `tasks` array in place of a line number.
    pub fn into_loaded(self) -> Result<LoadedConfig, ConfigError> {
        if self.quantum == Some(0) {
            return Err(ConfigError::Header(LineError {
                line: 0,
                message: "quantum must be > 0 (got 0)".to_string(),
            }));
        }

        let errors: Vec<LineError> = self
            .tasks
            .iter()
            .enumerate()
            .filter_map(|(idx, spec)| {
                Task::new(spec.clone()).err().map(|err| LineError {
                    line: idx + 1,
                    message: err.to_string(),
                })
            })
            .collect();
        if !errors.is_empty() {
            return Err(ConfigError::Lines(errors));
        }
        if self.tasks.is_empty() {
            return Err(ConfigError::NoTasks);
        }
        check_unique_ids(&self.tasks)?;

        let sim = self.sim_config();
        Ok(LoadedConfig {
            sim,
            tasks: self.tasks,
            warnings: Vec::new(),
        })
    }
}
