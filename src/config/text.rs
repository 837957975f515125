//! Line-oriented configuration format.
//!
//! ```text
//! # comment
//! SRTF;2
//! T1;#ff0000;0;5;1;
//! T2;#00ff00;2;3;1;E/S(1,2);IO:2-1
//! ```
//!
//! The first significant line names the policy and optionally the quantum.
//! Each following line is `id;color;arrival;duration[;priority[;events...]]`.
//! Events may be separated by `;` or by `,` outside parentheses:
//! `E/S(offset,duration)` and `IO:offset-duration` block for I/O;
//! `ML<n>:offset` and `MU<n>:offset` are mutex markers that the simulator
//! stores but does not act on.
//!
//! Task-line errors are collected so that one pass reports all of them.

use log::info;

use super::{check_unique_ids, ConfigError, LineError, LoadedConfig};
use crate::gantt::is_hex_color;
use crate::policy::PolicyKind;
use crate::simulator::{SimConfig, DEFAULT_QUANTUM};
use crate::task::{EventKind, Task, TaskEvent, TaskSpec, DEFAULT_COLOR};

const TASK_FORMAT: &str = "expected id;color;arrival;duration[;priority[;events]]";

/// Parse a whole configuration file.
pub fn parse_text(input: &str) -> Result<LoadedConfig, ConfigError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let mut warnings = Vec::new();
    let (header_no, header) = lines.next().ok_or(ConfigError::Empty)?;
    let (policy, quantum) = parse_header(header_no, header, &mut warnings)?;

    let mut tasks = Vec::new();
    let mut errors = Vec::new();
    for (line_no, line) in lines {
        match parse_task_line(line_no, line, &mut warnings) {
            Ok(spec) => tasks.push(spec),
            Err(message) => errors.push(LineError {
                line: line_no,
                message,
            }),
        }
    }

    if !errors.is_empty() {
        return Err(ConfigError::Lines(errors));
    }
    if tasks.is_empty() {
        return Err(ConfigError::NoTasks);
    }
    check_unique_ids(&tasks)?;

    let mut sim = SimConfig::new(policy);
    sim.quantum = quantum;
    Ok(LoadedConfig {
        sim,
        tasks,
        warnings,
    })
}

fn parse_header(
    line_no: usize,
    line: &str,
    warnings: &mut Vec<String>,
) -> Result<(PolicyKind, u64), ConfigError> {
    let header_err = |message: String| {
        ConfigError::Header(LineError {
            line: line_no,
            message,
        })
    };

    let mut parts = line.split(';').map(str::trim);
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(header_err("policy not specified".to_string()));
    }
    let policy = name
        .parse::<PolicyKind>()
        .map_err(|source| ConfigError::UnknownPolicy {
            line: line_no,
            source,
        })?;

    let quantum = match parts.next().filter(|q| !q.is_empty()) {
        Some(raw) => match raw.parse::<i64>() {
            Ok(q) if q > 0 => q as u64,
            Ok(_) => return Err(header_err(format!("quantum must be > 0 (got {raw})"))),
            Err(_) => return Err(header_err(format!("invalid quantum '{raw}'"))),
        },
        None => {
            warnings.push(format!(
                "line {line_no}: quantum not specified, using {DEFAULT_QUANTUM}"
            ));
            DEFAULT_QUANTUM
        }
    };
    Ok((policy, quantum))
}

fn parse_task_line(
    line_no: usize,
    line: &str,
    warnings: &mut Vec<String>,
) -> Result<TaskSpec, String> {
    let mut fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    if fields.len() < 4 {
        return Err(TASK_FORMAT.to_string());
    }

    let id = fields[0];
    let color = match fields[1] {
        "" => DEFAULT_COLOR,
        c => c,
    };
    let arrival = parse_int(fields[2], "arrival")?;
    let duration = parse_int(fields[3], "duration")?;
    let priority = match fields.get(4).filter(|p| !p.is_empty()) {
        Some(raw) => parse_int(raw, "priority")?,
        None => {
            warnings.push(format!(
                "line {line_no}: priority not specified for task '{id}', using 0"
            ));
            0
        }
    };

    let mut spec = TaskSpec::new(id, arrival, duration)
        .with_priority(priority)
        .with_color(color);
    Task::new(spec.clone()).map_err(|err| err.to_string())?;

    if !is_hex_color(color) {
        warnings.push(format!(
            "line {line_no}: color '{color}' is not #RGB or #RRGGBB"
        ));
    }

    for raw in fields.iter().skip(5) {
        for token in split_events(raw) {
            match parse_event(token) {
                Ok(event) => {
                    if let EventKind::MutexLock { .. } | EventKind::MutexUnlock { .. } = event.kind
                    {
                        info!("line {line_no}: mutex event '{token}' on task '{id}' is ignored");
                    } else if event.offset >= spec.duration as u64 {
                        warnings.push(format!(
                            "line {line_no}: event '{token}' on task '{id}' is past its duration and never fires"
                        ));
                    }
                    spec.events.push(event);
                }
                Err(reason) => warnings.push(format!(
                    "line {line_no}: skipping event '{token}' on task '{id}': {reason}"
                )),
            }
        }
    }
    Ok(spec)
}

fn parse_int(raw: &str, what: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("invalid {what} '{raw}'"))
}

/// Split on `,` or `;` at parenthesis depth zero, dropping empty pieces.
fn split_events(raw: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' | ';' if depth == 0 => {
                out.push(&raw[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&raw[start..]);
    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_event(token: &str) -> Result<TaskEvent, &'static str> {
    let upper = token.to_ascii_uppercase();

    if let Some(args) = upper
        .strip_prefix("E/S(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let (offset, duration) = args.split_once(',').ok_or("expected E/S(offset,duration)")?;
        let (offset, duration) = non_negative_pair(offset, duration)?;
        return Ok(TaskEvent::io(offset, duration));
    }

    if let Some(args) = upper.strip_prefix("IO:") {
        let (offset, duration) = args.split_once('-').ok_or("expected IO:offset-duration")?;
        let (offset, duration) = non_negative_pair(offset, duration)?;
        return Ok(TaskEvent::io(offset, duration));
    }

    for (prefix, lock) in [("ML", true), ("MU", false)] {
        let Some(rest) = upper.strip_prefix(prefix) else {
            continue;
        };
        let (mutex, offset) = rest.split_once(':').ok_or("expected M?<mutex>:offset")?;
        let mutex = mutex.trim().parse::<u32>().map_err(|_| "invalid mutex number")?;
        let offset = offset.trim().parse::<u64>().map_err(|_| "invalid offset")?;
        let kind = if lock {
            EventKind::MutexLock { mutex }
        } else {
            EventKind::MutexUnlock { mutex }
        };
        return Ok(TaskEvent { offset, kind });
    }

    Err("unrecognized event")
}

fn non_negative_pair(a: &str, b: &str) -> Result<(u64, u64), &'static str> {
    let a = a.trim().parse::<i64>().map_err(|_| "not an integer")?;
    let b = b.trim().parse::<i64>().map_err(|_| "not an integer")?;
    if a < 0 || b < 0 {
        return Err("negative values");
    }
    Ok((a as u64, b as u64))
}
