//! Property-based tests over random workloads.
//!
//! Run with: `cargo test --test property`
//!
//! `PROPTEST_CASES` overrides the case count; outside CI the defaults are
//! capped so local runs stay fast.

mod simulation;

// The library's helper is `cfg(test)` only, so share its source directly.
#[path = "../../src/test_utils.rs"]
mod test_utils;

use proptest::prelude::*;
use sched_sim_rs::{TaskEvent, TaskSpec};

pub use test_utils::proptest_cases;

#[test]
fn case_count_follows_ci_scaling() {
    if test_utils::env_u32("PROPTEST_CASES").is_some() {
        return;
    }
    let expected = if std::env::var_os("CI").is_some() { 128 } else { 16 };
    assert_eq!(proptest_cases(128), expected);
    assert_eq!(proptest_cases(0), 1);
}

/// Small workloads: up to 8 tasks, short durations, optional I/O event.
pub fn arb_workload() -> impl Strategy<Value = Vec<TaskSpec>> {
    let task = (
        0i64..12,
        1i64..8,
        0i64..4,
        proptest::option::of((0u64..8, 1u64..5)),
    );
    proptest::collection::vec(task, 1..8).prop_map(|tasks| {
        tasks
            .into_iter()
            .enumerate()
            .map(|(idx, (arrival, duration, priority, io))| {
                let spec = TaskSpec::new(format!("T{idx}"), arrival, duration).with_priority(priority);
                match io {
                    Some((offset, io)) => spec.with_event(TaskEvent::io(offset, io)),
                    None => spec,
                }
            })
            .collect()
    })
}
