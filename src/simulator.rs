//! Tick-driven orchestrator and its oracles.
//!
//! The simulator owns the clock, the policy, the task table and the I/O-wait
//! set, and is the only place where task transitions are applied. One call to
//! [`Simulator::tick`] resolves, in order:
//!
//! 1. admission of tasks arriving at the current tick,
//! 2. delivery of I/O completions due at the current tick,
//! 3. selection, including tasks that block at the tick boundary before using
//!    the CPU, then preemption of the previous task if it lost the CPU,
//! 4. dispatch and one tick of execution,
//! 5. the post-execution I/O check,
//! 6. removal of a task that just terminated,
//! 7. the history entry for the tick,
//! 8. the clock advance.
//!
//! Arrivals and wake-ups are therefore visible to selection on the tick they
//! happen, and the history holds exactly one entry per tick in tick order.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::policy::{PolicyKind, Scheduler};
use crate::sim::{SimClock, TraceEvent, TraceRing};
use crate::task::{Task, TaskError, TaskId, TaskSpec, TaskState};

pub const DEFAULT_QUANTUM: u64 = 1;
pub const DEFAULT_TRACE_CAPACITY: usize = 1024;

fn default_quantum() -> u64 {
    DEFAULT_QUANTUM
}

fn default_trace_capacity() -> usize {
    DEFAULT_TRACE_CAPACITY
}

/// Run parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub policy: PolicyKind,
    /// Carried from configuration and reported; none of the policies slice time.
    #[serde(default = "default_quantum")]
    pub quantum: u64,
    /// Abort bound for `run_to_completion`; `None` runs until finished.
    #[serde(default)]
    pub max_ticks: Option<u64>,
    #[serde(default = "default_trace_capacity")]
    pub trace_capacity: usize,
}

impl SimConfig {
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            quantum: DEFAULT_QUANTUM,
            max_ticks: None,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }
}

/// Simulator failures. All of them indicate broken input or a broken
/// orchestrator; an idle CPU or a truncated run is not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// A task rejected its construction record or a transition.
    Task(TaskError),
    /// Two tasks share an id.
    DuplicateTaskId { id: String },
    /// An oracle check failed.
    Invariant {
        code: u32,
        tick: u64,
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(err) => write!(f, "{err}"),
            Self::DuplicateTaskId { id } => write!(f, "duplicate task id '{id}'"),
            Self::Invariant {
                code,
                tick,
                message,
            } => write!(f, "invariant {code} violated at tick {tick}: {message}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<TaskError> for SimError {
    fn from(err: TaskError) -> Self {
        Self::Task(err)
    }
}

/// One history record: which task held the CPU during `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tick: u64,
    pub task: Option<TaskId>,
}

/// A blocked task and the tick at which it becomes ready again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoWait {
    pub task: TaskId,
    pub ready_at: u64,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub tick: u64,
    /// Task that consumed the CPU, `None` when idle.
    pub ran: Option<TaskId>,
    /// Task that lost the CPU to the selection.
    pub preempted: Option<TaskId>,
    /// Tasks that blocked at the tick boundary before running.
    pub blocked_before_run: Vec<TaskId>,
    /// Whether `ran` blocked after its tick.
    pub blocked_after_run: bool,
    /// Whether `ran` finished on this tick.
    pub terminated: bool,
}

/// Result of a run-to-completion.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub policy: PolicyKind,
    pub total_ticks: u64,
    /// False when the max-tick bound stopped the run early.
    pub completed: bool,
    /// Host time spent simulating, not simulated time.
    pub elapsed: Duration,
    pub history: Vec<HistoryEntry>,
}

/// Per-state task counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub new: usize,
    pub ready: usize,
    pub running: usize,
    pub blocked: usize,
    pub terminated: usize,
}

/// Blocked task as shown in a status snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedEntry {
    pub id: String,
    pub ready_at: u64,
}

/// Read-only view of the simulator between ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Next tick to be simulated.
    pub tick: u64,
    pub policy: PolicyKind,
    /// Task that ran last tick and still holds the CPU.
    pub running: Option<String>,
    /// Ready-list in policy order (includes the running task).
    pub ready: Vec<String>,
    pub blocked: Vec<BlockedEntry>,
    pub terminated: Vec<String>,
    pub counts: StateCounts,
    pub finished: bool,
}

pub struct Simulator {
    cfg: SimConfig,
    clock: SimClock,
    scheduler: Box<dyn Scheduler>,
    tasks: Vec<Task>,
    history: Vec<HistoryEntry>,
    io_wait: Vec<IoWait>,
    running: Option<TaskId>,
    trace: TraceRing,
}

impl Simulator {
    /// Build a simulator over already-validated tasks, in load order.
    ///
    /// # Errors
    /// [`SimError::DuplicateTaskId`] if two tasks share an id.
    pub fn new(cfg: SimConfig, tasks: Vec<Task>) -> Result<Self, SimError> {
        for (idx, task) in tasks.iter().enumerate() {
            if tasks[..idx].iter().any(|t| t.id() == task.id()) {
                return Err(SimError::DuplicateTaskId {
                    id: task.id().to_string(),
                });
            }
        }

        let scheduler = cfg.policy.build();
        let trace = TraceRing::new(cfg.trace_capacity);
        Ok(Self {
            cfg,
            clock: SimClock::new(),
            scheduler,
            tasks,
            history: Vec::new(),
            io_wait: Vec::new(),
            running: None,
            trace,
        })
    }

    /// Validate construction records and build the simulator.
    pub fn from_specs(cfg: SimConfig, specs: Vec<TaskSpec>) -> Result<Self, SimError> {
        let tasks = specs
            .into_iter()
            .map(Task::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(cfg, tasks)
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn policy(&self) -> PolicyKind {
        self.scheduler.kind()
    }

    /// Next tick to be simulated; equals the number of ticks simulated so far.
    pub fn now(&self) -> u64 {
        self.clock.now_ticks()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    /// Look a task up by its configured id.
    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks
            .iter()
            .position(|t| t.id() == name)
            .map(|idx| TaskId::from_u32(idx as u32))
    }

    /// Configured id for a history slot, `None` for idle.
    pub fn label(&self, id: Option<TaskId>) -> Option<&str> {
        id.map(|id| self.tasks[id.index()].id())
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn io_wait(&self) -> &[IoWait] {
        &self.io_wait
    }

    pub fn ready(&self) -> &[TaskId] {
        self.scheduler.ready()
    }

    pub fn running(&self) -> Option<TaskId> {
        self.running
    }

    pub fn trace(&self) -> &TraceRing {
        &self.trace
    }

    /// No task left outside `Terminated` and nobody waiting on I/O.
    pub fn is_finished(&self) -> bool {
        self.io_wait.is_empty() && self.tasks.iter().all(Task::is_terminated)
    }

    /// Simulate one tick.
    pub fn tick(&mut self) -> Result<TickOutcome, SimError> {
        let now = self.clock.now_ticks();
        let mut outcome = TickOutcome {
            tick: now,
            ..TickOutcome::default()
        };

        self.admit_arrivals(now);
        self.deliver_io(now)?;

        let prev = self.running.take();
        let mut selected = self.scheduler.select_next(&self.tasks);
        while let Some(id) = selected {
            if !self.tasks[id.index()].has_due_io() {
                break;
            }
            // Offset already reached: the task leaves at this boundary
            // without consuming the tick.
            self.dispatch(id, now);
            self.block_on_io(id, now)?;
            outcome.blocked_before_run.push(id);
            selected = self.scheduler.select_next(&self.tasks);
        }

        if let Some(prev) = prev {
            if selected != Some(prev) && self.tasks[prev.index()].preempt() {
                trace!("t={now} preempt {}", self.tasks[prev.index()].id());
                self.trace.push(TraceEvent::Preempt {
                    tick: now,
                    task: prev.as_u32(),
                });
                outcome.preempted = Some(prev);
            }
        }

        match selected {
            Some(id) => {
                self.dispatch(id, now);
                let finished = self.tasks[id.index()].run_one_tick(now)?;
                let remaining = self.tasks[id.index()].remaining();
                self.trace.push(TraceEvent::Run {
                    tick: now,
                    task: id.as_u32(),
                    remaining,
                });
                outcome.ran = Some(id);

                if finished {
                    self.scheduler.remove(id);
                    trace!("t={now} terminate {}", self.tasks[id.index()].id());
                    self.trace.push(TraceEvent::Terminate {
                        tick: now,
                        task: id.as_u32(),
                    });
                    outcome.terminated = true;
                } else if self.tasks[id.index()].has_due_io() {
                    self.block_on_io(id, now)?;
                    outcome.blocked_after_run = true;
                } else {
                    self.running = Some(id);
                }
            }
            None => {
                self.trace.push(TraceEvent::Idle { tick: now });
            }
        }

        debug!(
            "t={now} cpu={} ready={}",
            self.label(outcome.ran).unwrap_or("idle"),
            self.scheduler.ready().len()
        );
        self.history.push(HistoryEntry {
            tick: now,
            task: outcome.ran,
        });
        self.clock.tick();
        Ok(outcome)
    }

    /// Tick once and return the resulting status.
    pub fn step(&mut self) -> Result<StatusSnapshot, SimError> {
        self.tick()?;
        Ok(self.status())
    }

    /// Tick until finished or until the configured max-tick bound.
    pub fn run_to_completion(&mut self) -> Result<RunReport, SimError> {
        let started = Instant::now();
        info!(
            "simulating {} tasks with {}",
            self.tasks.len(),
            self.policy()
        );

        let mut completed = true;
        while !self.is_finished() {
            if let Some(max) = self.cfg.max_ticks {
                if self.clock.now_ticks() >= max {
                    warn!(
                        "max ticks ({max}) reached with {} unfinished tasks; run truncated",
                        self.tasks.iter().filter(|t| !t.is_terminated()).count()
                    );
                    completed = false;
                    break;
                }
            }
            self.tick()?;
        }

        let elapsed = started.elapsed();
        info!(
            "simulation stopped at tick {} (completed={completed}, {:?})",
            self.now(),
            elapsed
        );
        Ok(RunReport {
            policy: self.policy(),
            total_ticks: self.now(),
            completed,
            elapsed,
            history: self.history.clone(),
        })
    }

    /// Snapshot of the current state; never mutates.
    pub fn status(&self) -> StatusSnapshot {
        let mut counts = StateCounts::default();
        let mut terminated = Vec::new();
        for task in &self.tasks {
            match task.state() {
                TaskState::New => counts.new += 1,
                TaskState::Ready => counts.ready += 1,
                TaskState::Running => counts.running += 1,
                TaskState::Blocked => counts.blocked += 1,
                TaskState::Terminated => {
                    counts.terminated += 1;
                    terminated.push(task.id().to_string());
                }
            }
        }

        StatusSnapshot {
            tick: self.now(),
            policy: self.policy(),
            running: self.label(self.running).map(str::to_string),
            ready: self
                .scheduler
                .ready()
                .iter()
                .map(|id| self.tasks[id.index()].id().to_string())
                .collect(),
            blocked: self
                .io_wait
                .iter()
                .map(|w| BlockedEntry {
                    id: self.tasks[w.task.index()].id().to_string(),
                    ready_at: w.ready_at,
                })
                .collect(),
            terminated,
            counts,
            finished: self.is_finished(),
        }
    }

    /// Oracle: verify the cross-collection invariants.
    ///
    /// Codes:
    /// 1. `remaining + consumed != duration`
    /// 2. terminated task with CPU time left
    /// 3. ready-list and Ready/Running states disagree
    /// 4. I/O-wait set and Blocked states disagree
    /// 5. running slot and Running states disagree
    /// 6. history not one entry per tick in order
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let ready = self.scheduler.ready();
        for (idx, task) in self.tasks.iter().enumerate() {
            let id = TaskId::from_u32(idx as u32);
            if task.remaining() + task.consumed() != task.duration() {
                return self.violation(1, format!("task {} lost CPU time", task.id()));
            }
            if task.is_terminated() && task.remaining() != 0 {
                return self.violation(2, format!("task {} terminated early", task.id()));
            }

            let in_ready = ready.iter().filter(|t| **t == id).count();
            if in_ready != usize::from(task.state().is_eligible()) {
                return self.violation(
                    3,
                    format!(
                        "task {} is {} with {in_ready} ready-list entries",
                        task.id(),
                        task.state()
                    ),
                );
            }

            let waiting = self.io_wait.iter().filter(|w| w.task == id).count();
            if waiting != usize::from(task.state() == TaskState::Blocked) {
                return self.violation(
                    4,
                    format!(
                        "task {} is {} with {waiting} I/O-wait entries",
                        task.id(),
                        task.state()
                    ),
                );
            }

            let is_running = task.state() == TaskState::Running;
            if is_running != (self.running == Some(id)) {
                return self.violation(5, format!("running slot disagrees on {}", task.id()));
            }
        }

        let in_order = self
            .history
            .iter()
            .enumerate()
            .all(|(idx, entry)| entry.tick == idx as u64);
        if !in_order || self.history.len() as u64 != self.now() {
            return self.violation(6, "history is not one entry per tick".to_string());
        }
        Ok(())
    }

    fn admit_arrivals(&mut self, now: u64) {
        for idx in 0..self.tasks.len() {
            let task = &mut self.tasks[idx];
            if task.state() != TaskState::New || task.arrival() != now {
                continue;
            }
            task.admit();
            trace!("t={now} admit {}", task.id());
            let id = TaskId::from_u32(idx as u32);
            self.scheduler.add(id);
            self.trace.push(TraceEvent::Admit {
                tick: now,
                task: id.as_u32(),
            });
        }
    }

    fn deliver_io(&mut self, now: u64) -> Result<(), SimError> {
        let mut due = Vec::new();
        self.io_wait.retain(|w| {
            if w.ready_at <= now {
                due.push(w.task);
                false
            } else {
                true
            }
        });

        for id in due {
            self.tasks[id.index()].unblock()?;
            trace!("t={now} unblock {}", self.tasks[id.index()].id());
            self.scheduler.add(id);
            self.trace.push(TraceEvent::Unblock {
                tick: now,
                task: id.as_u32(),
            });
        }
        Ok(())
    }

    fn dispatch(&mut self, id: TaskId, now: u64) {
        if self.tasks[id.index()].dispatch() {
            trace!("t={now} dispatch {}", self.tasks[id.index()].id());
            self.trace.push(TraceEvent::Dispatch {
                tick: now,
                task: id.as_u32(),
            });
        }
    }

    /// Fire the due I/O event of a running task and park it.
    fn block_on_io(&mut self, id: TaskId, now: u64) -> Result<(), SimError> {
        let Some(duration) = self.tasks[id.index()].take_due_io() else {
            let message = format!("task {} has no due I/O event", self.tasks[id.index()].id());
            return self.violation(4, message);
        };
        self.tasks[id.index()].block()?;
        self.scheduler.remove(id);

        let ready_at = now.saturating_add(duration);
        trace!("t={now} block {} until {ready_at}", self.tasks[id.index()].id());
        self.io_wait.push(IoWait { task: id, ready_at });
        self.trace.push(TraceEvent::Block {
            tick: now,
            task: id.as_u32(),
            ready_at,
        });
        Ok(())
    }

    fn violation(&self, code: u32, message: String) -> Result<(), SimError> {
        Err(SimError::Invariant {
            code,
            tick: self.now(),
            message,
        })
    }
}
