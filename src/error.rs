//! Error taxonomy for table ingestion and schema validation.
//!
//! Every variant is raised before aggregation starts. Once a table has passed
//! [`crate::schema::validate_schema`], aggregation and rendering cannot fail.

use thiserror::Error;

/// Convenient alias for results produced by the ingestion core.
pub type TableResult<T> = std::result::Result<T, TableError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The input text contained no bytes at all.
    #[error("CSV input is empty")]
    EmptyInput,

    /// The tokenizer could not split the text into records.
    #[error("Malformed CSV near line {line}: {message}")]
    MalformedCsv { line: u64, message: String },

    /// The text tokenized into zero records, so there is no header row.
    #[error("CSV input does not have a header row")]
    MissingHeader,

    /// A data row does not fit the header under the active row-shape policy.
    #[error("Row on line {line} has {found} field(s) but the header declares {expected}")]
    RowShape {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Two header cells resolve to the same canonical column.
    #[error(
        "Columns {first} and {second} both resolve to '{column}'; remove or rename one of them"
    )]
    DuplicateColumn {
        column: String,
        first: usize,
        second: usize,
    },

    #[error("Missing required column(s): {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}
