//! Raw CSV text to [`ColumnTable`].
//!
//! The first record is the header row. Header cells are resolved through
//! [`HeaderAliases`] before they become column keys, and every data row is
//! checked against the header width using a single [`RowShape`] policy for the
//! whole input.

use std::collections::HashMap;

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    aliases::HeaderAliases,
    column_table::ColumnTable,
    error::{TableError, TableResult},
    io_utils,
};

/// How data rows whose width differs from the header are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RowShape {
    /// Any width mismatch rejects the input.
    Strict,
    /// Short rows are padded with empty cells; long rows are still rejected.
    #[default]
    Lenient,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub delimiter: u8,
    pub row_shape: RowShape,
    pub aliases: HeaderAliases,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
            row_shape: RowShape::default(),
            aliases: HeaderAliases::new(),
        }
    }
}

/// Ingests comma-separated text with the lenient row policy and built-in aliases.
pub fn ingest_table(raw: &str) -> TableResult<ColumnTable> {
    ingest_table_with(raw, &IngestOptions::default())
}

pub fn ingest_table_with(raw: &str, options: &IngestOptions) -> TableResult<ColumnTable> {
    if raw.is_empty() {
        return Err(TableError::EmptyInput);
    }
    ensure_quotes_well_formed(raw, options.delimiter)?;

    let mut reader = io_utils::csv_reader_builder(options.delimiter).from_reader(raw.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(malformed)?,
        None => return Err(TableError::MissingHeader),
    };
    let headers = canonical_headers(&header, &options.aliases)?;
    let expected = headers.len();
    let mut table = ColumnTable::with_headers(headers);

    for record in records {
        let record = record.map_err(malformed)?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let found = record.len();
        let short_and_lenient = found < expected && options.row_shape == RowShape::Lenient;
        if found != expected && !short_and_lenient {
            return Err(TableError::RowShape {
                line,
                expected,
                found,
            });
        }
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if found < expected {
            debug!("Padding row on line {line} with {} empty cell(s)", expected - found);
            cells.resize(expected, String::new());
        }
        table.push_row(cells);
    }

    debug!(
        "Ingested {} row(s) across {} column(s)",
        table.row_count(),
        table.headers().len()
    );
    Ok(table)
}

fn canonical_headers(
    header: &csv::StringRecord,
    aliases: &HeaderAliases,
) -> TableResult<Vec<String>> {
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(header.len());
    let mut headers = Vec::with_capacity(header.len());
    for (idx, raw) in header.iter().enumerate() {
        let canonical = aliases.canonical(raw);
        if canonical != raw {
            debug!("Header '{raw}' resolved to '{canonical}'");
        }
        if let Some(first) = seen.get(canonical) {
            return Err(TableError::DuplicateColumn {
                column: canonical.to_string(),
                first: first + 1,
                second: idx + 1,
            });
        }
        seen.insert(canonical.to_string(), idx);
        headers.push(canonical.to_string());
    }
    Ok(headers)
}

fn malformed(err: csv::Error) -> TableError {
    let line = err.position().map(|pos| pos.line()).unwrap_or_default();
    TableError::MalformedCsv {
        line,
        message: err.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    ClosingQuote,
}

/// The `csv` tokenizer accepts stray quotes and silently rewrites the field
/// around them. A quote may only open a field, appear doubled inside a quoted
/// field, or close one right before a delimiter, a line break or end of input.
fn ensure_quotes_well_formed(raw: &str, delimiter: u8) -> TableResult<()> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1u64;
    let mut open_line = line;
    for &byte in raw.trim_start_matches('\u{feff}').as_bytes() {
        let at_break = byte == b'\n' || byte == b'\r';
        state = match (state, byte) {
            (QuoteState::FieldStart, b'"') => {
                open_line = line;
                QuoteState::Quoted
            }
            (QuoteState::Unquoted, b'"') => {
                return Err(quote_error(line, "bare quote in unquoted field"));
            }
            (QuoteState::Quoted, b'"') => QuoteState::ClosingQuote,
            (QuoteState::ClosingQuote, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            (_, byte) if byte == delimiter || at_break => QuoteState::FieldStart,
            (QuoteState::ClosingQuote, _) => {
                return Err(quote_error(line, "unexpected text after closing quote"));
            }
            _ => QuoteState::Unquoted,
        };
        if byte == b'\n' {
            line += 1;
        }
    }
    if state == QuoteState::Quoted {
        return Err(quote_error(open_line, "unterminated quoted field"));
    }
    Ok(())
}

fn quote_error(line: u64, message: &str) -> TableError {
    TableError::MalformedCsv {
        line,
        message: message.to_string(),
    }
}
