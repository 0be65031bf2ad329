//! CRF extract transformation crate.
//!
//! Normalizes heterogeneous case-report-form exports into a consistent
//! schema. Every operator takes a [`Table`](crf_model::Table) and returns a
//! new one.
//!
//! # Overview
//!
//! This crate provides:
//! - **Column mapping**: rename, constant, drop, copy, reindex, and value remapping
//! - **Joins**: filtered left/inner joins against reference tables
//! - **Reshaping**: classic melt and attribute-carrying unpivots
//! - **Date normalization**: strict bulk parsing with a per-value fallback that
//!   imputes partial dates
//! - **Derived metrics**: durations, ages, study days, BMI
//!
//! # Example
//!
//! ```ignore
//! use crf_model::{DateOptions, JoinSpec};
//! use crf_transform::{DateNormalizer, DomainFrame, derived};
//!
//! let normalizer = DateNormalizer::new();
//! let ae = DomainFrame::new("AE", raw)
//!     .join(&dm, &JoinSpec::on(["SUBJID"]).keep(["RFSTDTC"]))?;
//! let data = normalizer.convert_column(ae.data, "AESTDTC", &DateOptions::new());
//! let data = derived::add_study_day(data, &normalizer, "AESTDTC", None, "RFSTDTC");
//! ```
//!
//! # Design Principles
//!
//! - **Recoverable problems are logged**: a bad value never aborts a table
//! - **Explicit inputs**: no hidden configuration or environment lookups
//! - **Pure per-value parsing**: the date fallback can run in any order

mod error;

pub mod cache;
pub mod columns;
pub mod datetime;
pub mod derived;
pub mod frame;
pub mod join;
pub mod numeric;
pub mod reshape;
pub mod values;

// Error type
pub use error::{Result, TransformError};

// Column mapping
pub use columns::{
    CollisionMode, ValueMap, add_constant_column, copy_columns, drop_columns, map_values,
    rename_columns, set_columns,
};
pub use values::{
    IdentifierColumns, add_conditional_value, add_usubjid, compute_ratio, filter_rows,
    split_column, substring, to_uppercase,
};

// Joins and reshaping
pub use join::join;
pub use reshape::{unpivot, unpivot2, unpivot2_bulk};

// Dates
pub use datetime::{DateNormalizer, DateParser, LenientDateParser, ParsedDate, only_date};

pub use cache::TableCache;
pub use frame::DomainFrame;
