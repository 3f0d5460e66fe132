//! Column-oriented table produced by ingestion.
//!
//! Cells are kept as raw strings; interpretation (numbers, statuses) happens in
//! the aggregation pass. Header order is remembered so the table can be written
//! back out or previewed in the order the source file used.

use std::{collections::HashMap, io::Write};

use anyhow::{Context, Result};

use crate::io_utils;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTable {
    headers: Vec<String>,
    columns: HashMap<String, Vec<String>>,
    row_count: usize,
}

impl ColumnTable {
    /// Creates an empty table with the given canonical headers.
    ///
    /// Callers are responsible for passing unique names; ingestion rejects
    /// duplicates before reaching this point.
    pub fn with_headers(headers: Vec<String>) -> Self {
        let columns = headers
            .iter()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        Self {
            headers,
            columns,
            row_count: 0,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Returns the cell at `row` in `column`, or an empty string when either is absent.
    pub fn cell(&self, column: &str, row: usize) -> &str {
        self.columns
            .get(column)
            .and_then(|values| values.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Materializes one row in header order.
    pub fn row(&self, index: usize) -> Option<Vec<&str>> {
        if index >= self.row_count {
            return None;
        }
        Some(
            self.headers
                .iter()
                .map(|name| self.cell(name, index))
                .collect(),
        )
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.row_count).filter_map(|idx| self.row(idx))
    }

    /// Appends a row whose cells are already aligned with [`Self::headers`].
    pub(crate) fn push_row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.headers.len());
        for (name, cell) in self.headers.iter().zip(cells) {
            if let Some(values) = self.columns.get_mut(name) {
                values.push(cell);
            }
        }
        self.row_count += 1;
    }

    /// Writes the canonical headers followed by every row.
    pub fn write_csv<W: Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer
            .write_record(&self.headers)
            .context("Writing header row")?;
        for (idx, row) in self.rows().enumerate() {
            writer
                .write_record(&row)
                .with_context(|| format!("Writing row {}", idx + 2))?;
        }
        writer.flush().context("Flushing CSV output")?;
        Ok(())
    }

    pub fn to_csv_string(&self, delimiter: u8) -> Result<String> {
        let mut writer = io_utils::csv_writer_builder(delimiter).from_writer(Vec::new());
        self.write_csv(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("Finishing CSV buffer: {}", err.error()))?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}
