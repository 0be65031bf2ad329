//! CSV reading into [`Table`]s.
//!
//! Every field is read as text; empty fields become [`Cell::Missing`](crf_model::Cell).
//! Typing is left to the transform stages.

use std::io::Cursor;
use std::path::Path;

use crf_model::{Column, Table};
use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const EOF_MARKER: &[u8] = b"EOF";

/// Options for [`read_table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Columns to keep, in this order. `None` keeps every column.
    pub columns: Option<Vec<String>>,
    /// Drop a trailing `EOF` line written by some EDC exports.
    pub strip_eof_marker: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            columns: None,
            strip_eof_marker: true,
        }
    }
}

impl IngestOptions {
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

/// Reads a CSV file with a header row into a text-only table.
///
/// A UTF-8 byte order mark is removed, and so is a trailing `EOF` marker
/// when [`IngestOptions::strip_eof_marker`] is set.
pub fn read_table(path: &Path, options: &IngestOptions) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::read(path, e))?;
    let mut content = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    if options.strip_eof_marker {
        content = strip_eof_marker(content);
    }
    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(content.to_vec()))
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let table = frame_to_table(&df)?;
    let table = match &options.columns {
        Some(columns) => {
            if let Some(column) = columns.iter().find(|c| !table.contains(c)) {
                return Err(IngestError::ColumnNotFound {
                    column: column.clone(),
                    path: path.to_path_buf(),
                });
            }
            table.select(columns)?
        }
        None => table,
    };

    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "read CSV"
    );
    Ok(table)
}

fn frame_to_table(df: &DataFrame) -> Result<Table> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let values = column.str()?;
        columns.push(Column::from_text(column.name().as_str(), values));
    }
    if columns.is_empty() {
        return Ok(Table::with_height(df.height()));
    }
    Ok(Table::new(columns)?)
}

/// Cuts the content at a final line holding only `EOF` (any case).
///
/// Trailing whitespace is ignored. Spaces may precede the marker on its
/// line; anything else means the marker is data and is left alone.
fn strip_eof_marker(content: &[u8]) -> &[u8] {
    let trimmed = content.trim_ascii_end();
    let Some(split) = trimmed.len().checked_sub(EOF_MARKER.len()) else {
        return content;
    };
    let (head, tail) = trimmed.split_at(split);
    if !tail.eq_ignore_ascii_case(EOF_MARKER) {
        return content;
    }
    let line_start = trim_trailing_spaces(head);
    match line_start.last() {
        None | Some(b'\n' | b'\r') => line_start,
        Some(_) => content,
    }
}

fn trim_trailing_spaces(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != b' ').map_or(0, |i| i + 1);
    &bytes[..end]
}
