//! Error types for trace input and report output.

use std::path::PathBuf;

/// Errors raised while reading a trace or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("cannot open trace {path}: {source}")]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV layer failed (I/O or framing).
    #[error("trace read error: {0}")]
    Csv(#[from] csv::Error),

    /// A row has fewer columns than the configured layout needs.
    #[error("line {line}: missing column {column} (row has {found} fields)")]
    MissingColumn {
        /// 1-based line number.
        line: u64,
        /// Zero-based column index that was requested.
        column: usize,
        /// Number of fields on the row.
        found: usize,
    },

    /// A numeric column did not hold a non-negative finite number.
    #[error("line {line}: column {column} is not a valid number: {value:?}")]
    InvalidNumber {
        /// 1-based line number.
        line: u64,
        /// Zero-based column index.
        column: usize,
        /// The raw field.
        value: String,
    },

    /// A report file could not be written.
    #[error("cannot write report {path}: {source}")]
    Output {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
