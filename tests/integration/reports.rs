use std::fs;

use sched_sim_rs::cli::{render_status, render_text, JsonReport};
use sched_sim_rs::gantt::{write_svg, GanttChart};
use sched_sim_rs::{PolicyKind, SimConfig, Simulator, TaskEvent, TaskSpec};

fn finished_fifo() -> (Simulator, sched_sim_rs::RunReport) {
    let mut sim = Simulator::from_specs(
        SimConfig::new(PolicyKind::Fifo),
        vec![
            TaskSpec::new("T1", 0, 4)
                .with_color("#ff0000")
                .with_event(TaskEvent::io(2, 3)),
            TaskSpec::new("T2", 0, 3).with_color("#00ff00"),
        ],
    )
    .expect("simulator");
    let run = sim.run_to_completion().expect("run");
    (sim, run)
}

#[test]
fn text_report_has_summary_table_and_chart() {
    let (sim, run) = finished_fifo();
    let text = render_text(&sim, &run);

    assert!(text.starts_with("policy FIFO | quantum 1 | 7 ticks | completed"));
    assert!(text.contains("TURNAROUND"));
    assert!(text.contains("T1 ##...##"), "{text}");
    assert!(text.contains("T2 ..###.."), "{text}");
}

#[test]
fn json_report_round_trips_through_serde_json() {
    let (sim, run) = finished_fifo();
    let value = serde_json::to_value(JsonReport::new(&sim, &run)).expect("serialize");

    assert_eq!(value["policy"], "FIFO");
    assert_eq!(value["total_ticks"], 7);
    assert_eq!(value["completed"], true);
    assert_eq!(value["history"][0], "T1");
    assert_eq!(value["history"].as_array().map(Vec::len), Some(7));
    assert_eq!(value["gantt"]["rows"][0]["spans"][1][0], 5);
    assert_eq!(value["metrics"]["rows"][1]["metrics"]["waiting"], 2);
}

#[test]
fn svg_chart_is_written_to_disk() {
    let (sim, _) = finished_fifo();
    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("gantt.svg");

    write_svg(&GanttChart::new(sim.tasks(), sim.history()), &path).expect("write svg");
    let svg = fs::read_to_string(&path).expect("read svg");
    assert!(svg.starts_with("<svg"));
    assert_eq!(svg.matches("fill=\"#ff0000\"").count(), 2);
    assert_eq!(svg.matches("fill=\"#00ff00\"").count(), 1);
}

#[test]
fn status_block_lists_every_collection() {
    let mut sim = Simulator::from_specs(
        SimConfig::new(PolicyKind::Srtf),
        vec![
            TaskSpec::new("A", 0, 2).with_event(TaskEvent::io(1, 4)),
            TaskSpec::new("B", 0, 3),
            TaskSpec::new("C", 5, 1),
        ],
    )
    .expect("simulator");
    let status = sim.step().expect("step");
    let text = render_status(&status);

    assert!(text.starts_with("tick 1 [SRTF]"), "{text}");
    assert!(text.contains("blocked:    A (until 4)"), "{text}");
    assert!(text.contains("ready:      B"), "{text}");
    assert!(text.contains("NOVO 1 | PRONTO 1 | EXECUTANDO 0 | BLOQUEADO 1 | TERMINADO 0"));
}
