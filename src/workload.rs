//! Seeded random task sets for bounded random runs and benchmarks.

use serde::{Deserialize, Serialize};

use crate::sim::SimRng;
use crate::task::{TaskEvent, TaskSpec};

const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

/// Shape of a generated workload. All ranges are inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadParams {
    pub tasks: usize,
    pub max_arrival: u64,
    pub max_duration: u64,
    pub max_priority: u64,
    /// Chance, in percent, that a task gets an I/O event.
    pub io_percent: u32,
    pub max_io: u64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            tasks: 8,
            max_arrival: 20,
            max_duration: 10,
            max_priority: 5,
            io_percent: 30,
            max_io: 5,
        }
    }
}

/// Generate `params.tasks` specs named `T1..Tn`. The same seed always yields
/// the same workload.
pub fn generate(seed: u64, params: &WorkloadParams) -> Vec<TaskSpec> {
    let mut rng = SimRng::new(seed);
    (0..params.tasks)
        .map(|idx| {
            let duration = rng.between(1, params.max_duration.max(1));
            let mut spec = TaskSpec::new(
                format!("T{}", idx + 1),
                rng.between(0, params.max_arrival) as i64,
                duration as i64,
            )
            .with_priority(rng.between(0, params.max_priority) as i64)
            .with_color(PALETTE[idx % PALETTE.len()]);

            // Offsets range over [0, duration) so that the event can fire.
            if rng.chance(params.io_percent.min(100), 100) {
                let offset = rng.between(0, duration - 1);
                let io = rng.between(1, params.max_io.max(1));
                spec = spec.with_event(TaskEvent::io(offset, io));
            }
            spec
        })
        .collect()
}
