//! Per-task and aggregate scheduling metrics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskMetrics, TaskState};

/// One report row. `metrics` is `None` for tasks that never terminated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub id: String,
    pub arrival: u64,
    pub duration: u64,
    pub priority: i64,
    pub state: TaskState,
    pub preemptions: u32,
    pub completed_at: Option<u64>,
    pub metrics: Option<TaskMetrics>,
}

/// Sums and means over terminated tasks only. Sums saturate at `u64::MAX`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub finished: usize,
    pub total_turnaround: u64,
    pub total_waiting: u64,
    pub total_response: u64,
    pub avg_turnaround: f64,
    pub avg_waiting: f64,
    pub avg_response: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Sorted by task id.
    pub rows: Vec<MetricsRow>,
    pub summary: MetricsSummary,
}

impl MetricsReport {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut rows: Vec<MetricsRow> = tasks
            .iter()
            .map(|t| MetricsRow {
                id: t.id().to_string(),
                arrival: t.arrival(),
                duration: t.duration(),
                priority: t.priority(),
                state: t.state(),
                preemptions: t.preemptions(),
                completed_at: t.completed_at(),
                metrics: t.metrics().ok(),
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));

        let mut summary = MetricsSummary::default();
        for m in rows.iter().filter_map(|r| r.metrics) {
            summary.finished += 1;
            summary.total_turnaround = summary.total_turnaround.saturating_add(m.turnaround);
            summary.total_waiting = summary.total_waiting.saturating_add(m.waiting);
            summary.total_response = summary.total_response.saturating_add(m.response);
        }
        if summary.finished > 0 {
            let n = summary.finished as f64;
            summary.avg_turnaround = summary.total_turnaround as f64 / n;
            summary.avg_waiting = summary.total_waiting as f64 / n;
            summary.avg_response = summary.total_response as f64 / n;
        }

        Self { rows, summary }
    }

    pub fn row(&self, id: &str) -> Option<&MetricsRow> {
        self.rows.iter().find(|r| r.id == id)
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.rows.iter().map(|r| r.id.len()).max().unwrap_or(2).max(2);
        writeln!(
            f,
            "{:<w$}  {:>7}  {:>8}  {:>10}  {:>8}  {:>8}  {:>6}",
            "ID", "ARRIVAL", "DURATION", "TURNAROUND", "WAITING", "RESPONSE", "PREEMP"
        )?;
        for row in &self.rows {
            let cell = |v: Option<u64>| v.map_or_else(|| "N/A".to_string(), |v| v.to_string());
            writeln!(
                f,
                "{:<w$}  {:>7}  {:>8}  {:>10}  {:>8}  {:>8}  {:>6}",
                row.id,
                row.arrival,
                row.duration,
                cell(row.metrics.map(|m| m.turnaround)),
                cell(row.metrics.map(|m| m.waiting)),
                cell(row.metrics.map(|m| m.response)),
                row.preemptions,
            )?;
        }
        let s = &self.summary;
        write!(
            f,
            "average over {} finished: turnaround {:.2}, waiting {:.2}, response {:.2}",
            s.finished, s.avg_turnaround, s.avg_waiting, s.avg_response
        )
    }
}
