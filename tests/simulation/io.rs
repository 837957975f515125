use sched_sim_rs::gantt::intervals;
use sched_sim_rs::simulator::IoWait;
use sched_sim_rs::{PolicyKind, SimConfig, Simulator, TaskEvent, TaskSpec, TaskState};

use crate::{run_checked, timeline};

#[test]
fn blocked_task_yields_cpu_and_rejoins_at_list_tail() {
    let sim = run_checked(
        PolicyKind::Fifo,
        vec![
            TaskSpec::new("T1", 0, 4).with_event(TaskEvent::io(2, 3)),
            TaskSpec::new("T2", 0, 3),
        ],
    );

    assert_eq!(timeline(&sim), ["T1", "T1", "T2", "T2", "T2", "T1", "T1"]);
    let spans: Vec<(u64, u64)> = intervals(sim.history())
        .iter()
        .map(|iv| (iv.start, iv.end))
        .collect();
    assert_eq!(spans, [(0, 2), (2, 5), (5, 7)]);

    let t1 = sim.task(sim.find("T1").unwrap()).metrics().unwrap();
    assert_eq!((t1.turnaround, t1.waiting, t1.response), (7, 3, 0));
    let t2 = sim.task(sim.find("T2").unwrap()).metrics().unwrap();
    assert_eq!((t2.turnaround, t2.waiting, t2.response), (5, 2, 2));
}

#[test]
fn cpu_idles_while_only_task_is_blocked() {
    let sim = run_checked(
        PolicyKind::Srtf,
        vec![TaskSpec::new("A", 0, 2).with_event(TaskEvent::io(1, 3))],
    );
    // Blocks at the end of tick 0 with ready_at = 0 + 3.
    assert_eq!(timeline(&sim), ["A", "-", "-", "A"]);
}

#[test]
fn offset_zero_blocks_before_first_tick() {
    let sim = run_checked(
        PolicyKind::Srtf,
        vec![
            TaskSpec::new("T1", 0, 2).with_event(TaskEvent::io(0, 2)),
            TaskSpec::new("T2", 0, 3),
        ],
    );

    assert_eq!(timeline(&sim), ["T2", "T2", "T2", "T1", "T1"]);
    let t1 = sim.task(sim.find("T1").unwrap());
    // The dispatch at tick 0 ended in a block; T1 first executes at tick 3.
    assert_eq!(t1.first_run(), Some(3));
    assert_eq!(t1.preemptions(), 0);
    let m = t1.metrics().unwrap();
    assert_eq!((m.turnaround, m.waiting, m.response), (5, 3, 3));
}

#[test]
fn response_counts_from_first_executed_tick_after_early_block() {
    let sim = run_checked(
        PolicyKind::Fifo,
        vec![
            TaskSpec::new("T1", 0, 2).with_event(TaskEvent::io(0, 5)),
            TaskSpec::new("T2", 0, 6),
        ],
    );

    assert_eq!(timeline(&sim), ["T2", "T2", "T2", "T2", "T2", "T2", "T1", "T1"]);
    let t1 = sim.task(sim.find("T1").unwrap());
    assert_eq!(t1.first_run(), Some(6));
    let m = t1.metrics().unwrap();
    assert_eq!((m.turnaround, m.waiting, m.response), (8, 6, 6));
}

#[test]
fn events_at_or_past_duration_never_fire() {
    let sim = run_checked(
        PolicyKind::Fifo,
        vec![TaskSpec::new("A", 0, 2)
            .with_event(TaskEvent::io(2, 5))
            .with_event(TaskEvent::io(7, 1))],
    );
    assert_eq!(timeline(&sim), ["A", "A"]);
}

#[test]
fn repeated_io_events_each_fire_once() {
    let sim = run_checked(
        PolicyKind::Fifo,
        vec![TaskSpec::new("A", 0, 3)
            .with_event(TaskEvent::io(1, 1))
            .with_event(TaskEvent::io(2, 2))],
    );
    // tick 0 run, block until 1; tick 1 run, block until 3; tick 3 run.
    assert_eq!(timeline(&sim), ["A", "A", "-", "A"]);
}

#[test]
fn wake_up_is_visible_to_selection_on_same_tick() {
    let mut sim = Simulator::from_specs(
        SimConfig::new(PolicyKind::Srtf),
        vec![
            TaskSpec::new("Short", 0, 3).with_event(TaskEvent::io(1, 2)),
            TaskSpec::new("Long", 0, 6),
        ],
    )
    .unwrap();

    sim.tick().unwrap();
    assert_eq!(
        sim.io_wait(),
        [IoWait {
            task: sim.find("Short").unwrap(),
            ready_at: 2,
        }]
    );
    assert_eq!(sim.task(sim.find("Short").unwrap()).state(), TaskState::Blocked);

    sim.tick().unwrap();
    let outcome = sim.tick().unwrap();
    // Short returns at tick 2 with 2 left and beats Long's 5.
    assert_eq!(outcome.ran, sim.find("Short"));
    assert_eq!(outcome.preempted, sim.find("Long"));
    sim.check_invariants().unwrap();
}

#[test]
fn mutex_events_do_not_change_the_schedule() {
    use sched_sim_rs::task::EventKind;

    let plain = run_checked(
        PolicyKind::Priority,
        vec![TaskSpec::new("A", 0, 3), TaskSpec::new("B", 1, 2).with_priority(-1)],
    );
    let with_mutex = run_checked(
        PolicyKind::Priority,
        vec![
            TaskSpec::new("A", 0, 3).with_event(TaskEvent {
                offset: 1,
                kind: EventKind::MutexLock { mutex: 1 },
            }),
            TaskSpec::new("B", 1, 2)
                .with_priority(-1)
                .with_event(TaskEvent {
                    offset: 1,
                    kind: EventKind::MutexUnlock { mutex: 1 },
                }),
        ],
    );
    assert_eq!(plain.history(), with_mutex.history());
}
