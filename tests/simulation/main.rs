//! Simulation tests for the tick orchestrator.
//!
//! - `scenarios`: hand-checked schedules for each policy.
//! - `io`: blocking, wake-up ordering and boundary cases.
//! - `corpus`: replay of `tests/corpus/scheduler/*.case.json`.
//! - `random`: bounded seeded workloads checked against the oracles.
//!
//! Run with: `cargo test --test simulation`

mod io;
mod random;

use sched_sim_rs::{PolicyKind, SimConfig, Simulator, TaskSpec};

/// Build a simulator, tick it to completion checking the oracles after every
/// tick, and return it.
pub fn run_checked(policy: PolicyKind, specs: Vec<TaskSpec>) -> Simulator {
    let mut sim = Simulator::from_specs(SimConfig::new(policy), specs).expect("valid tasks");
    while !sim.is_finished() {
        sim.tick().expect("tick");
        if let Err(err) = sim.check_invariants() {
            panic!("{err}");
        }
    }
    sim
}

/// History as task ids, `-` for idle ticks.
pub fn timeline(sim: &Simulator) -> Vec<String> {
    sim.history()
        .iter()
        .map(|e| sim.label(e.task).unwrap_or("-").to_string())
        .collect()
}
