//! Scheduling policies.
//!
//! A policy only ranks candidates. It keeps a ready-list of task ids in
//! insertion order and, once per tick, picks which eligible task should hold
//! the CPU. It never transitions tasks and never looks at I/O data; the
//! simulator applies dispatch, preemption and blocking.
//!
//! | Policy     | Pick                         | Ties            | Preemptive |
//! |------------|------------------------------|-----------------|------------|
//! | `Fifo`     | first eligible in list order | n/a             | no         |
//! | `Srtf`     | minimum remaining time       | earliest in list| yes        |
//! | `Priority` | minimum priority value       | earliest in list| yes        |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

mod fifo;
mod priority;
mod srtf;

pub use fifo::Fifo;
pub use priority::Priority;
pub use srtf::Srtf;

/// Ranking interface shared by every policy.
pub trait Scheduler {
    /// Which policy this is.
    fn kind(&self) -> PolicyKind;

    /// Append a task that just became ready (admitted or unblocked).
    fn add(&mut self, id: TaskId);

    /// Drop a task that blocked or terminated. Unknown ids are ignored.
    fn remove(&mut self, id: TaskId);

    /// Choose the task that should run this tick, or `None` to idle.
    ///
    /// Only entries whose state is `Ready` or `Running` are candidates.
    fn select_next(&self, tasks: &[Task]) -> Option<TaskId>;

    /// Ready-list contents in insertion order.
    fn ready(&self) -> &[TaskId];
}

/// Insertion-ordered ready-list shared by the policy implementations.
#[derive(Clone, Debug, Default)]
pub struct ReadyList {
    ids: Vec<TaskId>,
}

impl ReadyList {
    pub fn new() -> Self {
        Self { ids: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, id: TaskId) {
        debug_assert!(!self.ids.contains(&id), "task {id:?} added twice");
        self.ids.push(id);
    }

    #[inline]
    pub fn remove(&mut self, id: TaskId) {
        self.ids.retain(|t| *t != id);
    }

    #[inline]
    pub fn as_slice(&self) -> &[TaskId] {
        &self.ids
    }

    /// Eligible entries in list order.
    pub fn eligible<'a>(&'a self, tasks: &'a [Task]) -> impl Iterator<Item = TaskId> + 'a {
        self.ids
            .iter()
            .copied()
            .filter(move |id| tasks[id.index()].state().is_eligible())
    }

    /// Eligible entry minimizing `key`; the earliest one wins ties.
    ///
    /// `Iterator::min_by_key` returns the last minimum, which would break the
    /// list-order tie-break, hence the explicit strict comparison.
    pub fn min_eligible_by<K, F>(&self, tasks: &[Task], key: F) -> Option<TaskId>
    where
        K: Ord,
        F: Fn(&Task) -> K,
    {
        let mut best: Option<(TaskId, K)> = None;
        for id in self.eligible(tasks) {
            let k = key(&tasks[id.index()]);
            let better = match &best {
                Some((_, best_k)) => k < *best_k,
                None => true,
            };
            if better {
                best = Some((id, k));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Policy selector, as named in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyKind {
    #[serde(rename = "FIFO", alias = "fifo")]
    Fifo,
    #[serde(rename = "SRTF", alias = "srtf")]
    Srtf,
    #[serde(rename = "PRIORIDADE", alias = "PRIORITY", alias = "prioridade", alias = "priority")]
    Priority,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fifo, PolicyKind::Srtf, PolicyKind::Priority];

    /// Canonical configuration name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Srtf => "SRTF",
            Self::Priority => "PRIORIDADE",
        }
    }

    /// Whether the policy may take the CPU away from a running task.
    pub fn is_preemptive(self) -> bool {
        !matches!(self, Self::Fifo)
    }

    /// Fresh scheduler with an empty ready-list.
    pub fn build(self) -> Box<dyn Scheduler> {
        match self {
            Self::Fifo => Box::new(Fifo::new()),
            Self::Srtf => Box::new(Srtf::new()),
            Self::Priority => Box::new(Priority::new()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unrecognized policy name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownPolicy {
    pub name: String,
}

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            return write!(f, "policy name must not be empty");
        }
        let valid: Vec<&str> = PolicyKind::ALL.iter().map(|p| p.name()).collect();
        write!(
            f,
            "unknown policy '{}' (valid: {})",
            self.name,
            valid.join(", ")
        )
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Self::Fifo),
            "SRTF" => Ok(Self::Srtf),
            "PRIORIDADE" | "PRIORITY" => Ok(Self::Priority),
            _ => Err(UnknownPolicy {
                name: s.trim().to_string(),
            }),
        }
    }
}
