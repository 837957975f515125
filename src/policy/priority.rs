//! Static priority, preemptive. Lower value means more urgent.

use super::{PolicyKind, ReadyList, Scheduler};
use crate::task::{Task, TaskId};

#[derive(Clone, Debug, Default)]
pub struct Priority {
    ready: ReadyList,
}

impl Priority {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for Priority {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Priority
    }

    fn add(&mut self, id: TaskId) {
        self.ready.push(id);
    }

    fn remove(&mut self, id: TaskId) {
        self.ready.remove(id);
    }

    fn select_next(&self, tasks: &[Task]) -> Option<TaskId> {
        self.ready.min_eligible_by(tasks, Task::priority)
    }

    fn ready(&self) -> &[TaskId] {
        self.ready.as_slice()
    }
}
