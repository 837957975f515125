use std::fmt::Write;

use super::GanttChart;

/// Text chart: a tick axis, then one row per task with `#` for ticks on the
/// CPU and `.` otherwise.
///
/// ```text
///     0    5
/// T1 ##...##
/// T2 ..###..
/// ```
pub fn render_ascii(chart: &GanttChart) -> String {
    let label_width = chart.rows.iter().map(|r| r.id.len()).max().unwrap_or(0);
    let width = chart.width as usize;
    let mut out = String::new();

    let mut axis = vec![b' '; width];
    let mut tick = 0;
    while tick < width {
        let label = tick.to_string();
        if tick + label.len() <= width {
            axis[tick..tick + label.len()].copy_from_slice(label.as_bytes());
        }
        tick += 5;
    }
    let axis = String::from_utf8_lossy(&axis);
    let _ = writeln!(out, "{:label_width$} {}", "", axis.trim_end());

    for row in &chart.rows {
        let mut cells = vec!['.'; width];
        for &(start, end) in &row.spans {
            // Hand-built charts may carry spans past `width` or reversed.
            let end = (end as usize).min(width);
            let start = (start as usize).min(end);
            for cell in &mut cells[start..end] {
                *cell = '#';
            }
        }
        let cells: String = cells.into_iter().collect();
        let _ = writeln!(out, "{:label_width$} {cells}", row.id);
    }
    out
}
