//! CSV output for finished domains.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crf_model::Table;
use crf_transform::DomainFrame;
use polars::prelude::{Column as FrameColumn, CsvWriter, DataFrame, SerWriter};

use crate::error::{IngestError, Result};

/// Writes a table as UTF-8 CSV with a byte order mark and a header row.
///
/// Missing cells are written as empty fields. Dates use `YYYY-MM-DD` and
/// datetimes `YYYY-MM-DDTHH:MM:SS`.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut df = table_to_frame(table)?;
    let mut file = File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    CsvWriter::new(&mut file)
        .include_bom(true)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| IngestError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Writes a domain to `<dir>/<CODE>.csv` and returns the file path.
pub fn write_domain(frame: &DomainFrame, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| IngestError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.csv", frame.dataset_name()));
    write_table(&frame.data, &path)?;
    tracing::info!(
        domain = %frame.domain_code,
        rows = frame.row_count(),
        path = %path.display(),
        "domain written"
    );
    Ok(path)
}

fn table_to_frame(table: &Table) -> Result<DataFrame> {
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let values: Vec<Option<String>> = column.values.iter().map(|cell| cell.key()).collect();
            FrameColumn::new(column.name.as_str().into(), values)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| IngestError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
