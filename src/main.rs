//! CPU scheduling simulator CLI.
//!
//! Loads a task configuration, simulates it tick by tick under the configured
//! policy (FIFO, SRTF or PRIORIDADE) and reports per-task metrics and a Gantt
//! chart.
//!
//! # Exit Codes
//!
//! - `0`: Success, including runs truncated by `--max-ticks`
//! - `1`: Configuration or simulation error
//! - `2`: Invalid arguments

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::{info, warn};

use sched_sim_rs::cli::{self, CliArgs, JsonReport, Mode, OutputFormat};
use sched_sim_rs::config::load_path;
use sched_sim_rs::gantt::{write_svg, GanttChart};
use sched_sim_rs::logger;
use sched_sim_rs::metrics::MetricsReport;
use sched_sim_rs::simulator::Simulator;

fn main() {
    let args = cli::parse_args();
    logger::init(args.log_level());

    if let Err(err) = run(&args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<()> {
    let loaded = load_path(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!("{}", loaded.summary());

    let mut cfg = loaded.sim;
    if args.max_ticks.is_some() {
        cfg.max_ticks = args.max_ticks;
    }
    let mut sim = Simulator::from_specs(cfg, loaded.tasks).context("building simulator")?;

    match args.mode {
        Mode::Full => run_full(&mut sim, args)?,
        Mode::Step => run_step(&mut sim)?,
    }

    if let Some(path) = &args.svg {
        let chart = GanttChart::new(sim.tasks(), sim.history());
        write_svg(&chart, path).with_context(|| format!("writing {}", path.display()))?;
        info!("gantt chart written to {}", path.display());
    }

    if args.trace {
        let trace = sim.trace();
        if trace.evicted() > 0 {
            warn!("trace ring evicted {} older events", trace.evicted());
        }
        let mut out = io::stdout().lock();
        for event in trace.iter() {
            writeln!(out, "{:>6} {event:?}", event.tick())?;
        }
    }
    Ok(())
}

fn run_full(sim: &mut Simulator, args: &CliArgs) -> Result<()> {
    let report = sim.run_to_completion()?;
    let mut out = io::stdout().lock();
    match args.format {
        OutputFormat::Text => write!(out, "{}", cli::render_text(sim, &report))?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &JsonReport::new(sim, &report))?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn run_step(sim: &mut Simulator) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let max_ticks = sim.config().max_ticks;

    println!("{}", cli::render_status(&sim.status()));
    while !sim.is_finished() {
        if max_ticks.is_some_and(|max| sim.now() >= max) {
            warn!("max ticks reached; stopping");
            break;
        }
        print!("[Enter] next tick, [q] quit > ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        if line?.trim().eq_ignore_ascii_case("q") {
            break;
        }
        let status = sim.step()?;
        sim.check_invariants()?;
        println!("{}", cli::render_status(&status));
    }

    if sim.is_finished() {
        println!();
        println!("{}", MetricsReport::from_tasks(sim.tasks()));
    }
    Ok(())
}
