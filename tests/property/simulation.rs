//! Whole-run properties: conservation, metric bounds, history shape.

use proptest::prelude::*;
use sched_sim_rs::gantt::intervals;
use sched_sim_rs::{PolicyKind, SimConfig, Simulator, TaskSpec};

use crate::{arb_workload, proptest_cases};

fn arb_policy() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Fifo),
        Just(PolicyKind::Srtf),
        Just(PolicyKind::Priority),
    ]
}

fn run(policy: PolicyKind, specs: Vec<TaskSpec>) -> Simulator {
    let mut sim = Simulator::from_specs(SimConfig::new(policy), specs).unwrap();
    sim.run_to_completion().unwrap();
    sim
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(proptest_cases(128)))]

    #[test]
    fn prop_every_task_finishes_with_conserved_time(
        policy in arb_policy(),
        specs in arb_workload(),
    ) {
        let sim = run(policy, specs);
        prop_assert!(sim.is_finished());
        sim.check_invariants().unwrap();

        for task in sim.tasks() {
            prop_assert_eq!(task.remaining(), 0);
            prop_assert_eq!(task.consumed(), task.duration());
            let m = task.metrics().unwrap();
            prop_assert!(m.turnaround >= task.duration());
            prop_assert_eq!(m.waiting, m.turnaround - task.duration());
            prop_assert!(task.first_run().unwrap() >= task.arrival());
        }
    }

    #[test]
    fn prop_history_is_one_entry_per_tick(
        policy in arb_policy(),
        specs in arb_workload(),
    ) {
        let sim = run(policy, specs);
        let history = sim.history();
        prop_assert_eq!(history.len() as u64, sim.now());
        for (idx, entry) in history.iter().enumerate() {
            prop_assert_eq!(entry.tick, idx as u64);
        }

        // CPU ticks in the history add up to the total work.
        let busy = history.iter().filter(|e| e.task.is_some()).count() as u64;
        let work: u64 = sim.tasks().iter().map(|t| t.duration()).sum();
        prop_assert_eq!(busy, work);

        let spans = intervals(history);
        let covered: u64 = spans.iter().map(|iv| iv.len()).sum();
        prop_assert_eq!(covered, busy);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
            if pair[0].end == pair[1].start {
                prop_assert_ne!(pair[0].task, pair[1].task);
            }
        }
    }

    #[test]
    fn prop_fifo_never_preempts(specs in arb_workload()) {
        let sim = run(PolicyKind::Fifo, specs);
        for task in sim.tasks() {
            prop_assert_eq!(task.preemptions(), 0);
        }
    }

    #[test]
    fn prop_runs_are_deterministic(
        policy in arb_policy(),
        specs in arb_workload(),
    ) {
        let a = run(policy, specs.clone());
        let b = run(policy, specs);
        prop_assert_eq!(a.history(), b.history());
    }
}
