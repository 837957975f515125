//! Discrete-event simulator of a single-CPU process scheduler.
//!
//! ## Scope
//! Synthetic tasks arrive at given ticks, request a given amount of CPU time
//! and may block for I/O at given points of their execution. A pluggable
//! policy (FIFO, SRTF or non-aging Priority) hands the one virtual CPU to one
//! task per tick. The run records enough history to draw a Gantt chart and to
//! compute turnaround, waiting and response time for each task.
//!
//! ## Key invariants
//! - Time is a logical tick counter; nothing reads the OS clock to decide
//!   scheduling, so identical inputs produce identical runs.
//! - `remaining + consumed == duration` for every task at every tick.
//! - A task is in exactly one place at a time: not yet arrived, in the
//!   ready-list, in the I/O-wait set, or terminated.
//! - The history holds exactly one entry per simulated tick, in order.
//!
//! ## Tick flow
//! `admit arrivals -> deliver I/O -> select -> preempt -> dispatch -> run ->
//! block on I/O | terminate -> history -> clock`
//!
//! ## Notable entry points
//! - [`Simulator`] / [`SimConfig`]: tick loop, run-to-completion, single step.
//! - [`Task`] / [`TaskSpec`]: task control block and its construction record.
//! - [`PolicyKind`] / [`Scheduler`]: policy selection and the ranking trait.
//! - [`config::load_path`]: text or JSON configuration loading.
//! - [`gantt`] and [`MetricsReport`]: derived views over a finished run.

pub mod cli;
pub mod config;
pub mod gantt;
pub mod logger;
pub mod metrics;
pub mod policy;
pub mod sim;
pub mod simulator;
pub mod task;
#[cfg(test)]
pub mod test_utils;
pub mod workload;

pub use config::{ConfigError, LoadedConfig};
pub use metrics::MetricsReport;
pub use policy::{PolicyKind, Scheduler};
pub use simulator::{RunReport, SimConfig, SimError, Simulator, StatusSnapshot};
pub use task::{Task, TaskError, TaskEvent, TaskId, TaskSpec, TaskState};
