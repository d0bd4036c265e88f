use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{rows::Row, value::Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Renders plain string rows under `headers`, left-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let aligns = vec![Align::Left; headers.len()];
    render_with(headers, rows, &aligns)
}

/// Renders typed rows, right-aligning columns whose non-null values are all
/// numeric.
pub fn render_rows(headers: &[String], rows: &[Row]) -> String {
    let aligns = (0..headers.len())
        .map(|idx| {
            let numeric = rows
                .iter()
                .filter_map(|row| row.values().get(idx))
                .filter(|value| !value.is_null())
                .all(|value| matches!(value, Value::Integer(_) | Value::Float(_)));
            if numeric && !rows.is_empty() {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect::<Vec<_>>();
    let cells = rows.iter().map(Row::display_cells).collect::<Vec<_>>();
    render_with(headers, &cells, &aligns)
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn render_with(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| display_width(h).max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths, aligns));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &widths, aligns));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths, aligns));
    }
    output
}

fn format_line(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let mut line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            match aligns.get(idx) {
                Some(Align::Right) => format!("{padding}{cell}"),
                _ => format!("{cell}{padding}"),
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.truncate(line.trim_end().len());
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
