//! Shortest remaining time first, re-evaluated every tick.

use super::{PolicyKind, ReadyList, Scheduler};
use crate::task::{Task, TaskId};

#[derive(Clone, Debug, Default)]
pub struct Srtf {
    ready: ReadyList,
}

impl Srtf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Srtf {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Srtf
    }

    fn add(&mut self, id: TaskId) {
        self.ready.push(id);
    }

    fn remove(&mut self, id: TaskId) {
        self.ready.remove(id);
    }

    fn select_next(&self, tasks: &[Task]) -> Option<TaskId> {
        self.ready.min_eligible_by(tasks, Task::remaining)
    }

    fn ready(&self) -> &[TaskId] {
        self.ready.as_slice()
    }
}
