//! Elastic plain-text rendering of a [`ColumnTable`] for terminal previews.

use std::{borrow::Cow, fmt::Write as _};

use itertools::Itertools;

use crate::column_table::ColumnTable;

const COLUMN_GAP: &str = "  ";

/// Renders the headers and up to `limit` rows, each column padded to its widest cell.
pub fn render_preview(table: &ColumnTable, limit: usize) -> String {
    let headers = table.headers();
    let rows: Vec<Vec<Cow<'_, str>>> = table
        .rows()
        .take(limit)
        .map(|row| row.into_iter().map(flatten_cell).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", pad_line(headers.iter().map(String::as_str), &widths));
    let _ = writeln!(
        output,
        "{}",
        pad_line(widths.iter().map(|w| "-".repeat(*w)), &widths)
    );
    for row in &rows {
        let _ = writeln!(output, "{}", pad_line(row, &widths));
    }
    let _ = writeln!(
        output,
        "({} of {} row(s) shown)",
        rows.len(),
        table.row_count()
    );
    output
}

fn pad_line<I, S>(cells: I, widths: &[usize]) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let line = cells
        .into_iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

/// Newlines and tabs inside quoted cells would break the grid.
fn flatten_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
