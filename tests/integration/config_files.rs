use std::fs;

use sched_sim_rs::config::{load_path, ConfigError};
use sched_sim_rs::{PolicyKind, Simulator, TaskEvent};

const TEXT_CONFIG: &str = "\
# two CPU-bound tasks and one that blocks
SRTF;3
T1;#ff0000;0;5;2;
T2;#00ff00;1;2;1;E/S(1,2)
T3;;2;1
";

#[test]
fn loads_text_config_from_disk() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("tasks.txt");
    fs::write(&path, TEXT_CONFIG).expect("write config");

    let loaded = load_path(&path).expect("load config");
    assert_eq!(loaded.sim.policy, PolicyKind::Srtf);
    assert_eq!(loaded.sim.quantum, 3);
    assert_eq!(loaded.tasks.len(), 3);
    assert_eq!(loaded.tasks[1].events, vec![TaskEvent::io(1, 2)]);
    // T3 has no priority.
    assert_eq!(loaded.warnings.len(), 1, "{:?}", loaded.warnings);

    let summary = loaded.summary();
    assert_eq!(summary.tasks, 3);
    assert_eq!(summary.total_duration, 8);
    assert_eq!((summary.first_arrival, summary.last_arrival), (0, 2));

    let mut sim = Simulator::from_specs(loaded.sim, loaded.tasks).expect("simulator");
    let report = sim.run_to_completion().expect("run");
    assert!(report.completed);
    sim.check_invariants().expect("invariants");
}

#[test]
fn json_extension_selects_scenario_format() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("scenario.JSON");
    fs::write(
        &path,
        r#"{"policy": "FIFO", "max_ticks": 3, "tasks": [{"id": "A", "arrival": 0, "duration": 9}]}"#,
    )
    .expect("write scenario");

    let loaded = load_path(&path).expect("load scenario");
    assert_eq!(loaded.sim.max_ticks, Some(3));

    let mut sim = Simulator::from_specs(loaded.sim, loaded.tasks).expect("simulator");
    let report = sim.run_to_completion().expect("run");
    assert!(!report.completed);
    assert_eq!(report.total_ticks, 3);
}

#[test]
fn utf8_bom_is_ignored() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("bom.txt");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"FIFO;1\nA;#abc;0;1;0\n");
    fs::write(&path, bytes).expect("write config");

    let loaded = load_path(&path).expect("load config");
    assert_eq!(loaded.sim.policy, PolicyKind::Fifo);
}

#[test]
fn missing_file_is_an_io_error() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let err = load_path(&tmp.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.txt"));
}

#[test]
fn all_bad_lines_are_reported_together() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("bad.txt");
    fs::write(&path, "FIFO;1\nA;#abc;-1;2;0\nB;#abc;0;x;0\nC;#abc;0;1;0\n").expect("write");

    let err = load_path(&path).unwrap_err();
    let text = err.to_string();
    assert!(text.starts_with("2 invalid task line(s)"), "{text}");
    assert!(text.contains("line 2: task A: arrival must be >= 0"), "{text}");
    assert!(text.contains("line 3: invalid duration 'x'"), "{text}");
}
