//! Interval view of a run's history and its renderers.
//!
//! The history holds one `(tick, task)` entry per tick. [`intervals`] folds it
//! into half-open `[start, end)` runs of the same task; an idle tick closes the
//! open run. [`GanttChart`] groups those runs per task for rendering.

mod ascii;
mod svg;

pub use ascii::render_ascii;
pub use svg::{render_svg, write_svg};

use serde::{Deserialize, Serialize};

use crate::simulator::HistoryEntry;
use crate::task::{Task, TaskId};

/// Color used when a task has no usable color.
pub const FALLBACK_COLOR: &str = "#CCCCCC";

/// Consecutive ticks during which one task held the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttInterval {
    pub task: TaskId,
    pub start: u64,
    pub end: u64,
}

impl GanttInterval {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
}

/// Coalesce the history into intervals, in start order.
pub fn intervals(history: &[HistoryEntry]) -> Vec<GanttInterval> {
    let mut out: Vec<GanttInterval> = Vec::new();
    let mut open: Option<GanttInterval> = None;

    for entry in history {
        if let (Some(cur), Some(task)) = (open.as_mut(), entry.task) {
            if cur.task == task && cur.end == entry.tick {
                cur.end = entry.tick + 1;
                continue;
            }
        }
        out.extend(open.take());
        open = entry.task.map(|task| GanttInterval {
            task,
            start: entry.tick,
            end: entry.tick + 1,
        });
    }
    out.extend(open);
    out
}

/// One chart row: a task and the intervals it ran.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttRow {
    pub id: String,
    pub color: String,
    pub spans: Vec<(u64, u64)>,
}

/// Per-task interval rows, sorted by task id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttChart {
    pub rows: Vec<GanttRow>,
    /// Number of ticks covered (end of the last history entry).
    pub width: u64,
}

impl GanttChart {
    /// Build the chart for `tasks` (in load order, as indexed by `TaskId`).
    ///
    /// Every task gets a row, including tasks that never ran.
    pub fn new(tasks: &[Task], history: &[HistoryEntry]) -> Self {
        let mut rows: Vec<GanttRow> = tasks
            .iter()
            .map(|t| GanttRow {
                id: t.id().to_string(),
                color: display_color(t.color()).to_string(),
                spans: Vec::new(),
            })
            .collect();

        for iv in intervals(history) {
            if let Some(row) = rows.get_mut(iv.task.index()) {
                row.spans.push((iv.start, iv.end));
            }
        }
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            rows,
            width: history.last().map_or(0, |e| e.tick + 1),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// `color` if it is a `#RGB`/`#RRGGBB` hex color, else the fallback.
pub fn display_color(color: &str) -> &str {
    if is_hex_color(color) {
        color
    } else {
        FALLBACK_COLOR
    }
}

pub fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}
