//! Date parsing and imputation.
//!
//! A column goes through two independent paths: a strict bulk parse with a
//! single inferred format, and a per-value fallback made of the partial-date
//! rules followed by a pluggable [`DateParser`].

pub mod lenient;
pub mod normalizer;
pub mod partial;

use chrono::{NaiveDate, NaiveDateTime, SubsecRound};
use crf_model::Cell;

pub use lenient::{DateParser, LenientDateParser};
pub use normalizer::DateNormalizer;
pub use partial::{PartialDate, PartialOutcome, apply_rules};

/// A successfully parsed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl ParsedDate {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::DateTime(dt) => dt.date(),
        }
    }

    /// Drops sub-second precision.
    pub fn truncated(self) -> Self {
        match self {
            Self::Date(date) => Self::Date(date),
            Self::DateTime(dt) => Self::DateTime(dt.trunc_subsecs(0)),
        }
    }
}

impl From<ParsedDate> for Cell {
    fn from(value: ParsedDate) -> Self {
        match value {
            ParsedDate::Date(date) => Cell::Date(date),
            ParsedDate::DateTime(dt) => Cell::DateTime(dt),
        }
    }
}

/// Keeps only the calendar date of a datetime cell.
pub fn only_date(cell: Cell) -> Cell {
    match cell {
        Cell::DateTime(dt) => Cell::Date(dt.date()),
        other => other,
    }
}
