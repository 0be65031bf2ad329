//! CSV ingestion and output for CRF extracts.
//!
//! # Overview
//!
//! - [`read_table`]: header-row CSV to an all-text [`Table`](crf_model::Table)
//! - [`write_table`] / [`write_domain`]: UTF-8 CSV with a byte order mark
//! - [`CsvDirectorySource`]: a [`TableSource`](crf_model::TableSource) over a
//!   directory of `<name>.csv` files, for use with
//!   [`TableCache`](crf_transform::TableCache)
//!
//! # Example
//!
//! ```ignore
//! use crf_ingest::{CsvDirectorySource, write_domain};
//! use crf_transform::{DomainFrame, TableCache};
//!
//! let mut cache = TableCache::new(CsvDirectorySource::new("raw"));
//! let dm = DomainFrame::new("DM", cache.get("dm")?.clone());
//! write_domain(&dm, Path::new("sdtm"))?;
//! ```

pub mod error;
pub mod reader;
pub mod source;
pub mod writer;

pub use error::{IngestError, Result};
pub use reader::{IngestOptions, read_table};
pub use source::CsvDirectorySource;
pub use writer::{write_domain, write_table};
