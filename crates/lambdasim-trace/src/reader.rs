//! Streaming trace reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use lambdasim_types::Record;
use tracing::debug;

use crate::error::TraceError;

/// Zero-based column positions of the fields a [`Record`] is built from.
///
/// Defaults match the registry trace layout the simulator was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceColumns {
    /// Object key.
    pub key: usize,
    /// Object size in bytes (float literal).
    pub size: usize,
    /// Raw timestamp string.
    pub timestamp: usize,
    /// Hour bucket (float literal).
    pub hour: usize,
    /// 15-minute bucket (float literal).
    pub quarter_hour: usize,
}

impl Default for TraceColumns {
    fn default() -> Self {
        Self {
            key: 6,
            size: 9,
            timestamp: 11,
            hour: 12,
            quarter_hour: 14,
        }
    }
}

/// Iterator over the records of a headerless delimited trace.
///
/// Rows are read lazily; the first malformed row yields an error, after
/// which callers are expected to stop.
pub struct TraceReader<R: Read> {
    rows: csv::StringRecordsIntoIter<R>,
    columns: TraceColumns,
    rows_read: u64,
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file.
    pub fn open(
        path: impl AsRef<Path>,
        columns: TraceColumns,
        delimiter: u8,
    ) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened trace");
        Ok(Self::from_reader(BufReader::new(file), columns, delimiter))
    }
}

impl<R: Read> TraceReader<R> {
    /// Read a trace from any byte source.
    pub fn from_reader(reader: R, columns: TraceColumns, delimiter: u8) -> Self {
        let rows = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader)
            .into_records();
        Self {
            rows,
            columns,
            rows_read: 0,
        }
    }

    /// Number of rows consumed so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn parse(&self, row: &csv::StringRecord) -> Result<Record, TraceError> {
        let line = row
            .position()
            .map(csv::Position::line)
            .unwrap_or(self.rows_read);
        let field = |column: usize| {
            row.get(column).ok_or(TraceError::MissingColumn {
                line,
                column,
                found: row.len(),
            })
        };
        let number = |column: usize| -> Result<u64, TraceError> {
            let raw = field(column)?;
            parse_truncated(raw).ok_or_else(|| TraceError::InvalidNumber {
                line,
                column,
                value: raw.to_string(),
            })
        };

        Ok(Record {
            key: field(self.columns.key)?.to_string(),
            size: number(self.columns.size)?,
            timestamp: field(self.columns.timestamp)?.to_string(),
            timestamp_hour: number(self.columns.hour)?,
            timestamp_15min: number(self.columns.quarter_hour)?,
        })
    }
}

impl<R: Read> Iterator for TraceReader<R> {
    type Item = Result<Record, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(err) => return Some(Err(err.into())),
        };
        self.rows_read += 1;
        Some(self.parse(&row))
    }
}

/// Parse a float literal and truncate it towards zero.
///
/// Rejects negative, NaN, and infinite values.
fn parse_truncated(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value as u64)
}
