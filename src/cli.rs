//! Command-line parsing and report formatting for `sched-sim`.
//!
//! Hand-rolled (no clap dependency).
//!
//! # Grammar
//!
//! ```text
//! sched-sim <config> [--mode=full|step] [--max-ticks=N] [--svg=PATH]
//!                    [--format=text|json] [--trace] [-v|-vv]
//! sched-sim --help | -h
//! ```

use std::env;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::PathBuf;

use log::LevelFilter;
use serde::Serialize;

use crate::gantt::{render_ascii, GanttChart};
use crate::metrics::MetricsReport;
use crate::policy::PolicyKind;
use crate::simulator::{RunReport, Simulator, StatusSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Run to completion and print the report.
    Full,
    /// Tick on each Enter, print the status, stop on `q`.
    Step,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub config: PathBuf,
    pub mode: Mode,
    pub max_ticks: Option<u64>,
    pub svg: Option<PathBuf>,
    pub format: OutputFormat,
    pub trace: bool,
    /// Number of `-v` flags.
    pub verbosity: u8,
}

impl CliArgs {
    /// Log level for the stderr logger.
    ///
    /// `-v`/`-vv` win; otherwise `SCHED_SIM_LOG` (a `log` level name) is
    /// consulted, then the default of `warn`.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => env::var("SCHED_SIM_LOG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(LevelFilter::Warn),
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

/// Parse `std::env::args_os()`.
///
/// Exits the process with code 2 on invalid arguments, printing a
/// diagnostic and usage summary to stderr.
pub fn parse_args() -> CliArgs {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "sched-sim".into());
    match parse_from(args) {
        Ok(Command::Run(cli)) => cli,
        Ok(Command::Help) => {
            print_usage(&exe);
            std::process::exit(0);
        }
        Err(msg) => {
            eprintln!("error: {msg}");
            eprintln!();
            print_usage(&exe);
            std::process::exit(2);
        }
    }
}

/// Parse arguments (without the program name).
pub fn parse_from<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut config: Option<PathBuf> = None;
    let mut mode = Mode::Full;
    let mut max_ticks = None;
    let mut svg = None;
    let mut format = OutputFormat::Text;
    let mut trace = false;
    let mut verbosity = 0u8;

    for arg in args {
        if let Some(flag) = arg.to_str() {
            if let Some(rest) = flag.strip_prefix("--mode=") {
                mode = match rest {
                    "full" => Mode::Full,
                    "step" => Mode::Step,
                    _ => return Err(format!("invalid --mode '{rest}'; expected full or step")),
                };
                continue;
            }
            if let Some(rest) = flag.strip_prefix("--max-ticks=") {
                let n: u64 = rest
                    .parse()
                    .map_err(|_| format!("invalid --max-ticks value: {rest}"))?;
                if n == 0 {
                    return Err("--max-ticks must be >= 1".to_string());
                }
                max_ticks = Some(n);
                continue;
            }
            if let Some(rest) = flag.strip_prefix("--svg=") {
                if rest.is_empty() {
                    return Err("--svg requires a path".to_string());
                }
                svg = Some(PathBuf::from(rest));
                continue;
            }
            if let Some(rest) = flag.strip_prefix("--format=") {
                format = match rest {
                    "text" => OutputFormat::Text,
                    "json" => OutputFormat::Json,
                    _ => return Err(format!("invalid --format '{rest}'; expected text or json")),
                };
                continue;
            }
            match flag {
                "--trace" => {
                    trace = true;
                    continue;
                }
                "-v" => {
                    verbosity = verbosity.saturating_add(1);
                    continue;
                }
                "-vv" => {
                    verbosity = verbosity.saturating_add(2);
                    continue;
                }
                "--help" | "-h" => return Ok(Command::Help),
                _ if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(format!("unknown flag: {flag}"));
                }
                _ => {}
            }
        }

        if config.is_some() {
            return Err("multiple configuration files provided".to_string());
        }
        config = Some(PathBuf::from(arg));
    }

    let Some(config) = config else {
        return Err("a configuration file is required".to_string());
    };
    Ok(Command::Run(CliArgs {
        config,
        mode,
        max_ticks,
        svg,
        format,
        trace,
        verbosity,
    }))
}

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} <config> [OPTIONS]

Simulate a CPU scheduler over the tasks described in <config>
(text format, or a JSON scenario when the file ends in .json).

OPTIONS:
    --mode=full|step        Run to completion (default) or tick on each Enter
    --max-ticks=<N>         Stop after N ticks even if tasks remain
    --svg=<PATH>            Write the Gantt chart as SVG
    --format=text|json      Report format for full mode (default: text)
    --trace                 Print the transition trace after the report
    -v, -vv                 Increase log verbosity (also: SCHED_SIM_LOG=<level>)
    --help, -h              Show this help message",
        exe.to_string_lossy()
    );
}

/// Full-mode report in machine-readable form.
#[derive(Clone, Debug, Serialize)]
pub struct JsonReport {
    pub policy: PolicyKind,
    pub quantum: u64,
    pub total_ticks: u64,
    pub completed: bool,
    pub elapsed_micros: u128,
    /// Task id per tick, `null` when idle.
    pub history: Vec<Option<String>>,
    pub gantt: GanttChart,
    pub metrics: MetricsReport,
}

impl JsonReport {
    pub fn new(sim: &Simulator, run: &RunReport) -> Self {
        Self {
            policy: run.policy,
            quantum: sim.config().quantum,
            total_ticks: run.total_ticks,
            completed: run.completed,
            elapsed_micros: run.elapsed.as_micros(),
            history: run
                .history
                .iter()
                .map(|e| sim.label(e.task).map(str::to_string))
                .collect(),
            gantt: GanttChart::new(sim.tasks(), &run.history),
            metrics: MetricsReport::from_tasks(sim.tasks()),
        }
    }
}

/// Full-mode report for a terminal: summary line, metrics table, ASCII chart.
pub fn render_text(sim: &Simulator, run: &RunReport) -> String {
    let mut out = String::new();
    let status = if run.completed {
        "completed"
    } else {
        "INCOMPLETE (max ticks reached)"
    };
    let _ = writeln!(
        out,
        "policy {} | quantum {} | {} ticks | {status} | {:.3} ms",
        run.policy,
        sim.config().quantum,
        run.total_ticks,
        run.elapsed.as_secs_f64() * 1000.0
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", MetricsReport::from_tasks(sim.tasks()));
    let _ = writeln!(out);
    out.push_str(&render_ascii(&GanttChart::new(sim.tasks(), &run.history)));
    out
}

/// Step-mode status block.
pub fn render_status(status: &StatusSnapshot) -> String {
    let mut out = String::new();
    let none = || "-".to_string();
    let _ = writeln!(out, "tick {} [{}]", status.tick, status.policy);
    let _ = writeln!(
        out,
        "  running:    {}",
        status.running.clone().unwrap_or_else(none)
    );
    let _ = writeln!(out, "  ready:      {}", join_or_dash(&status.ready));
    let blocked: Vec<String> = status
        .blocked
        .iter()
        .map(|b| format!("{} (until {})", b.id, b.ready_at))
        .collect();
    let _ = writeln!(out, "  blocked:    {}", join_or_dash(&blocked));
    let _ = writeln!(out, "  terminated: {}", join_or_dash(&status.terminated));
    let c = &status.counts;
    let _ = write!(
        out,
        "  NOVO {} | PRONTO {} | EXECUTANDO {} | BLOQUEADO {} | TERMINADO {}",
        c.new, c.ready, c.running, c.blocked, c.terminated
    );
    out
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}
