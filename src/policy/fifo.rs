//! First-in, first-out: the earliest admitted eligible task keeps the CPU.
//!
//! New arrivals and unblocked tasks go to the back of the list, and the
//! running task stays at or ahead of every other candidate, so once it is
//! dispatched nothing displaces it until it blocks or terminates.

use super::{PolicyKind, ReadyList, Scheduler};
use crate::task::{Task, TaskId};

#[derive(Clone, Debug, Default)]
pub struct Fifo {
    ready: ReadyList,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Fifo {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn add(&mut self, id: TaskId) {
        self.ready.push(id);
    }

    fn remove(&mut self, id: TaskId) {
        self.ready.remove(id);
    }

    fn select_next(&self, tasks: &[Task]) -> Option<TaskId> {
        self.ready.eligible(tasks).next()
    }

    fn ready(&self) -> &[TaskId] {
        self.ready.as_slice()
    }
}
