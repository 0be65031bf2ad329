//! Cell values.
//!
//! Every ingested field starts life as [`Cell::Text`] or [`Cell::Missing`];
//! the date normalizer and derived metrics introduce the typed variants.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A single value in a [`Table`](crate::Table) column.
///
/// `Missing` is the only "no value" marker. An empty string is a present,
/// empty text value and is kept distinct from `Missing`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value.
    #[default]
    Missing,
    /// Raw or derived text.
    Text(String),
    /// Calendar date without time of day.
    Date(NaiveDate),
    /// Date with time of day, whole-second precision, no timezone.
    DateTime(NaiveDateTime),
    /// Integer result (durations, study days, ages).
    Int(i64),
    /// Floating point result (ratios, BMI).
    Float(f64),
}

impl Cell {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Missing, or text that is exactly empty.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(value) => value.is_empty(),
            _ => false,
        }
    }

    /// Missing, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the calendar date of a `Date` or `DateTime` cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Returns a `DateTime` cell as is, or a `Date` cell at midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(date) => Some(date.and_time(chrono::NaiveTime::MIN)),
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date(_) | Self::DateTime(_))
    }

    /// Text form used for comparisons and lookups; `None` for missing.
    pub fn key(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            other => Some(other.to_string()),
        }
    }
}

/// Formats a floating-point number without trailing zeros.
pub fn format_numeric(value: f64) -> String {
    let rendered = format!("{value}");
    if rendered.contains('.') {
        rendered
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        rendered
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_numeric(*value)),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}
