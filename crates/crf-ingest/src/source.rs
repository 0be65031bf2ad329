//! Directory-backed table source.

use std::path::{Path, PathBuf};

use crf_model::{Table, TableSource};

use crate::error::IngestError;
use crate::reader::{IngestOptions, read_table};

/// Loads `<root>/<name>.csv` for each requested table name.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
    options: IngestOptions,
}

impl CsvDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            options: IngestOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.csv"))
    }
}

impl TableSource for CsvDirectorySource {
    type Error = IngestError;

    fn load(&self, name: &str) -> Result<Table, IngestError> {
        read_table(&self.path_for(name), &self.options)
    }
}
