use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use super::GanttChart;

const TICK_PX: u64 = 24;
const ROW_PX: u64 = 28;
const LABEL_PX: u64 = 80;
const AXIS_PX: u64 = 24;
const BAR_PAD: u64 = 4;

/// Standalone SVG document for the chart.
///
/// Layout: a label column, one row per task with one rect per interval filled
/// with the task color, and a tick axis under the rows.
pub fn render_svg(chart: &GanttChart) -> String {
    let rows = chart.height() as u64;
    let width = LABEL_PX + chart.width * TICK_PX + BAR_PAD;
    let height = rows * ROW_PX + AXIS_PX;
    let mut out = String::new();

    let _ = writeln!(
        out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="monospace" font-size="12">"##
    );
    let _ = writeln!(
        out,
        r##"  <rect x="0" y="0" width="{width}" height="{height}" fill="#ffffff"/>"##
    );

    for (idx, row) in chart.rows.iter().enumerate() {
        let y = idx as u64 * ROW_PX;
        let _ = writeln!(
            out,
            r##"  <text x="4" y="{}">{}</text>"##,
            y + ROW_PX / 2 + 4,
            escape(&row.id)
        );
        for &(start, end) in &row.spans {
            let _ = writeln!(
                out,
                r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="#333333"><title>{} [{start}, {end})</title></rect>"##,
                LABEL_PX + start * TICK_PX,
                y + BAR_PAD,
                (end - start) * TICK_PX,
                ROW_PX - 2 * BAR_PAD,
                escape(&row.color),
                escape(&row.id),
            );
        }
    }

    let axis_y = rows * ROW_PX;
    let _ = writeln!(
        out,
        r##"  <line x1="{LABEL_PX}" y1="{axis_y}" x2="{}" y2="{axis_y}" stroke="#000000"/>"##,
        LABEL_PX + chart.width * TICK_PX
    );
    for tick in 0..=chart.width {
        let _ = writeln!(
            out,
            r##"  <text x="{}" y="{}" text-anchor="middle">{tick}</text>"##,
            LABEL_PX + tick * TICK_PX,
            axis_y + AXIS_PX - 6
        );
    }
    out.push_str("</svg>\n");
    out
}

/// Render the chart and write it to `path`.
pub fn write_svg(chart: &GanttChart, path: &Path) -> io::Result<()> {
    fs::write(path, render_svg(chart))
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
