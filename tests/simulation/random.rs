//! Bounded random simulations over seeded workloads.
//!
//! `SIM_SCHEDULER_SEED_START` / `SIM_SCHEDULER_SEED_COUNT` select the seeds.

use sched_sim_rs::workload::{generate, WorkloadParams};
use sched_sim_rs::{PolicyKind, SimConfig, Simulator, TaskState};

const DEFAULT_SEED_COUNT: u64 = 50;

fn seed_value_from_env(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Upper bound on ticks any generated workload can need: last arrival plus
/// all CPU and all I/O time.
fn tick_bound(params: &WorkloadParams) -> u64 {
    let per_task = params.max_duration + params.max_io;
    params.max_arrival + per_task * params.tasks as u64 + 1
}

#[test]
fn bounded_random_scheduler_sims() {
    let params = WorkloadParams::default();
    let bound = tick_bound(&params);
    let seed_start = seed_value_from_env("SIM_SCHEDULER_SEED_START", 0);
    let seed_count = seed_value_from_env("SIM_SCHEDULER_SEED_COUNT", DEFAULT_SEED_COUNT);

    for seed in seed_start..seed_start.saturating_add(seed_count) {
        let specs = generate(seed, &params);
        for policy in PolicyKind::ALL {
            let cfg = SimConfig::new(policy).with_max_ticks(bound);
            let mut sim = Simulator::from_specs(cfg, specs.clone()).expect("generated tasks");

            while !sim.is_finished() {
                assert!(sim.now() < bound, "seed {seed} {policy}: no progress");
                let outcome = sim.tick().expect("tick");
                if let Err(err) = sim.check_invariants() {
                    panic!("seed {seed} {policy}: {err}");
                }
                // Work conserving: idle only when nothing is runnable.
                if outcome.ran.is_none() {
                    assert!(
                        sim.tasks().iter().all(|t| t.state() != TaskState::Ready),
                        "seed {seed} {policy}: idle with ready tasks at {}",
                        outcome.tick
                    );
                }
            }

            for task in sim.tasks() {
                let m = task.metrics().expect("terminated");
                assert!(m.turnaround >= task.duration());
                assert!(m.response <= m.waiting + task.duration());
                if policy == PolicyKind::Fifo {
                    assert_eq!(task.preemptions(), 0, "seed {seed}: FIFO preempted");
                }
            }
        }
    }
}
