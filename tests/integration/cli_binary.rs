use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

const CONFIG: &str = "PRIORIDADE;1\nT1;#ff0000;0;4;3\nT2;#00ff00;1;3;1\nT3;#0000ff;2;2;2\n";

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_sched-sim")
}

#[test]
fn full_mode_prints_report_and_writes_svg() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let config = tmp.path().join("tasks.txt");
    let svg = tmp.path().join("out.svg");
    fs::write(&config, CONFIG).expect("write config");

    let output = Command::new(binary())
        .arg(&config)
        .arg(format!("--svg={}", svg.display()))
        .output()
        .expect("run sched-sim");

    assert!(
        output.status.success(),
        "sched-sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("policy PRIORIDADE"), "{stdout}");
    assert!(stdout.contains("9 ticks | completed"), "{stdout}");
    assert!(svg.exists());
}

#[test]
fn json_format_is_machine_readable() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let config = tmp.path().join("tasks.txt");
    fs::write(&config, CONFIG).expect("write config");

    let output = Command::new(binary())
        .arg("--format=json")
        .arg(&config)
        .output()
        .expect("run sched-sim");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(value["total_ticks"], 9);
    assert_eq!(value["history"][1], "T2");
}

#[test]
fn step_mode_stops_on_quit() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let config = tmp.path().join("tasks.txt");
    fs::write(&config, CONFIG).expect("write config");

    let mut child = Command::new(binary())
        .arg("--mode=step")
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn sched-sim");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"\n\nq\n")
        .expect("write stdin");
    let output = child.wait_with_output().expect("wait");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tick 0 [PRIORIDADE]"), "{stdout}");
    assert!(stdout.contains("tick 2 [PRIORIDADE]"), "{stdout}");
    assert!(!stdout.contains("tick 3 [PRIORIDADE]"), "{stdout}");
}

#[test]
fn usage_and_runtime_errors_use_distinct_exit_codes() {
    let status = Command::new(binary())
        .arg("--format=yaml")
        .arg("x.txt")
        .stderr(Stdio::null())
        .status()
        .expect("run sched-sim");
    assert_eq!(status.code(), Some(2));

    let tmp = tempfile::tempdir().expect("create temp dir");
    let config = tmp.path().join("bad.txt");
    fs::write(&config, "RR;2\nA;#abc;0;1;0\n").expect("write config");
    let output = Command::new(binary())
        .arg(&config)
        .output()
        .expect("run sched-sim");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown policy 'RR'"), "{stderr}");
}
