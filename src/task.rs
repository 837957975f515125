//! Task control block and its lifecycle state machine.
//!
//! A [`Task`] is one simulated process. Its static parameters (arrival,
//! duration, priority, event list) are fixed at construction; everything else
//! is dynamic state mutated only by the simulator.
//!
//! Lifecycle:
//!
//! ```text
//! New --admit--> Ready --dispatch--> Running --run_one_tick--> Terminated
//!                  ^                   |  |
//!                  +------preempt------+  |
//!                  ^                      v
//!                  +------unblock----- Blocked
//! ```
//!
//! `admit`, `dispatch` and `preempt` are guarded: calling them from the wrong
//! state is a no-op that reports `false`, so repeating them is harmless.
//! `run_one_tick`, `block`, `unblock` and `metrics` are contract checks: a wrong
//! state means the orchestrator is broken, and they return [`TaskError`].
//!
//! Invariant: `remaining + consumed == duration` at all times.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dense task handle: the task's index in load order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(u32);

impl TaskId {
    #[inline(always)]
    pub fn from_u32(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    New,
    Ready,
    Running,
    Blocked,
    Terminated,
}

impl TaskState {
    /// Label used in reports and the step console.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "NOVO",
            Self::Ready => "PRONTO",
            Self::Running => "EXECUTANDO",
            Self::Blocked => "BLOQUEADO",
            Self::Terminated => "TERMINADO",
        }
    }

    /// Whether a scheduler may pick a task in this state.
    #[inline(always)]
    pub fn is_eligible(self) -> bool {
        matches!(self, Self::Ready | Self::Running)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a scheduled task event does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Leave the CPU for `duration` ticks.
    Io { duration: u64 },
    /// Parsed but inert: no contention model exists for mutexes.
    MutexLock { mutex: u32 },
    /// Parsed but inert, see `MutexLock`.
    MutexUnlock { mutex: u32 },
}

/// An event fired when the task's consumed CPU time reaches `offset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub offset: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl TaskEvent {
    pub fn io(offset: u64, duration: u64) -> Self {
        Self {
            offset,
            kind: EventKind::Io { duration },
        }
    }
}

pub const DEFAULT_COLOR: &str = "#808080";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Construction record for a task, as produced by configuration loading.
///
/// Numeric fields are signed so that out-of-range input survives parsing and
/// is rejected by [`Task::new`] with a precise error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub arrival: i64,
    pub duration: i64,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub events: Vec<TaskEvent>,
}

impl TaskSpec {
    /// Minimal spec with default color, priority 0 and no events.
    pub fn new(id: impl Into<String>, arrival: i64, duration: i64) -> Self {
        Self {
            id: id.into(),
            color: default_color(),
            arrival,
            duration,
            priority: 0,
            events: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_event(mut self, event: TaskEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// Task construction and transition errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskError {
    /// Task id is empty or whitespace.
    EmptyId,
    /// Arrival before tick 0.
    NegativeArrival { id: String, arrival: i64 },
    /// Duration of zero or less.
    NonPositiveDuration { id: String, duration: i64 },
    /// Operation attempted from a state that does not allow it.
    InvalidTransition {
        id: String,
        op: &'static str,
        state: TaskState,
    },
    /// Metrics requested before the task terminated.
    NotTerminated { id: String, state: TaskState },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id must not be empty"),
            Self::NegativeArrival { id, arrival } => {
                write!(f, "task {id}: arrival must be >= 0 (got {arrival})")
            }
            Self::NonPositiveDuration { id, duration } => {
                write!(f, "task {id}: duration must be > 0 (got {duration})")
            }
            Self::InvalidTransition { id, op, state } => {
                write!(f, "task {id}: cannot {op} while {state}")
            }
            Self::NotTerminated { id, state } => {
                write!(f, "task {id}: metrics undefined while {state}")
            }
        }
    }
}

impl std::error::Error for TaskError {}

/// Per-task scheduling metrics, defined once the task terminated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetrics {
    pub turnaround: u64,
    pub waiting: u64,
    pub response: u64,
}

/// Task control block.
#[derive(Clone, Debug)]
pub struct Task {
    id: String,
    color: String,
    arrival: u64,
    duration: u64,
    priority: i64,
    events: Vec<TaskEvent>,

    state: TaskState,
    remaining: u64,
    consumed: u64,
    first_run: Option<u64>,
    completed_at: Option<u64>,
    preemptions: u32,
    /// Parallel to `events`; an I/O event fires at most once.
    fired: Vec<bool>,
}

impl Task {
    /// Validate a spec and build a task in `New`.
    ///
    /// # Errors
    /// Returns [`TaskError`] for an empty id, a negative arrival or a
    /// non-positive duration.
    pub fn new(spec: TaskSpec) -> Result<Self, TaskError> {
        let TaskSpec {
            id,
            color,
            arrival,
            duration,
            priority,
            events,
        } = spec;

        let id = id.trim().to_string();
        if id.is_empty() {
            return Err(TaskError::EmptyId);
        }
        if arrival < 0 {
            return Err(TaskError::NegativeArrival { id, arrival });
        }
        if duration <= 0 {
            return Err(TaskError::NonPositiveDuration { id, duration });
        }

        let fired = vec![false; events.len()];
        Ok(Self {
            id,
            color,
            arrival: arrival as u64,
            duration: duration as u64,
            priority,
            events,
            state: TaskState::New,
            remaining: duration as u64,
            consumed: 0,
            first_run: None,
            completed_at: None,
            preemptions: 0,
            fired,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn arrival(&self) -> u64 {
        self.arrival
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn events(&self) -> &[TaskEvent] {
        &self.events
    }

    #[inline(always)]
    pub fn state(&self) -> TaskState {
        self.state
    }

    #[inline(always)]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[inline(always)]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn first_run(&self) -> Option<u64> {
        self.first_run
    }

    pub fn completed_at(&self) -> Option<u64> {
        self.completed_at
    }

    pub fn preemptions(&self) -> u32 {
        self.preemptions
    }

    pub fn is_terminated(&self) -> bool {
        self.state == TaskState::Terminated
    }

    /// New -> Ready.
    pub fn admit(&mut self) -> bool {
        if self.state != TaskState::New {
            return false;
        }
        self.state = TaskState::Ready;
        true
    }

    /// Ready -> Running.
    pub fn dispatch(&mut self) -> bool {
        if self.state != TaskState::Ready {
            return false;
        }
        self.state = TaskState::Running;
        true
    }

    /// Running -> Ready, counting the preemption.
    pub fn preempt(&mut self) -> bool {
        if self.state != TaskState::Running {
            return false;
        }
        self.state = TaskState::Ready;
        self.preemptions += 1;
        true
    }

    /// Consume one tick of CPU. Returns `true` if this tick finished the task.
    ///
    /// The first call records the response tick. Completion is recorded at
    /// `now + 1`: the task leaves the CPU at the end of the tick that brought
    /// `remaining` to zero.
    pub fn run_one_tick(&mut self, now: u64) -> Result<bool, TaskError> {
        if self.state != TaskState::Running {
            return Err(self.invalid("run"));
        }
        debug_assert!(self.remaining > 0);

        if self.first_run.is_none() {
            self.first_run = Some(now);
        }

        self.remaining -= 1;
        self.consumed += 1;
        if self.remaining == 0 {
            self.state = TaskState::Terminated;
            self.completed_at = Some(now + 1);
            return Ok(true);
        }
        Ok(false)
    }

    /// Running -> Blocked.
    pub fn block(&mut self) -> Result<(), TaskError> {
        if self.state != TaskState::Running {
            return Err(self.invalid("block"));
        }
        self.state = TaskState::Blocked;
        Ok(())
    }

    /// Blocked -> Ready.
    pub fn unblock(&mut self) -> Result<(), TaskError> {
        if self.state != TaskState::Blocked {
            return Err(self.invalid("unblock"));
        }
        self.state = TaskState::Ready;
        Ok(())
    }

    /// Whether an unfired I/O event is due at the current consumed time.
    pub fn has_due_io(&self) -> bool {
        self.due_io().is_some()
    }

    /// Block duration of the first unfired I/O event whose offset equals the
    /// current consumed time, marking it fired.
    pub fn take_due_io(&mut self) -> Option<u64> {
        let (idx, duration) = self.due_io()?;
        self.fired[idx] = true;
        Some(duration)
    }

    fn due_io(&self) -> Option<(usize, u64)> {
        self.events
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.fired[*idx])
            .find_map(|(idx, ev)| match ev.kind {
                EventKind::Io { duration } if ev.offset == self.consumed => Some((idx, duration)),
                _ => None,
            })
    }

    /// Turnaround, waiting and response time.
    pub fn metrics(&self) -> Result<TaskMetrics, TaskError> {
        let (Some(completed), TaskState::Terminated) = (self.completed_at, self.state) else {
            return Err(TaskError::NotTerminated {
                id: self.id.clone(),
                state: self.state,
            });
        };

        let turnaround = completed - self.arrival;
        let response = self
            .first_run
            .map(|t| t.saturating_sub(self.arrival))
            .unwrap_or(0);
        Ok(TaskMetrics {
            turnaround,
            waiting: turnaround.saturating_sub(self.duration),
            response,
        })
    }

    fn invalid(&self, op: &'static str) -> TaskError {
        TaskError::InvalidTransition {
            id: self.id.clone(),
            op,
            state: self.state,
        }
    }
}
