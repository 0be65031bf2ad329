//! Row predicates used by join filters and row filtering.

use std::fmt;
use std::sync::Arc;

use crate::row::RowView;

/// Decides whether a row is kept.
pub trait RowPredicate {
    fn matches(&self, row: &RowView<'_>) -> bool;
}

impl<F> RowPredicate for F
where
    F: Fn(&RowView<'_>) -> bool,
{
    fn matches(&self, row: &RowView<'_>) -> bool {
        self(row)
    }
}

/// Built-in predicates plus a closure escape hatch.
///
/// A filter naming a column the table does not have matches no rows.
#[derive(Clone)]
pub enum RowFilter {
    /// Rendered cell text equals `value`.
    Equals { column: String, value: String },
    /// Cell is the missing marker.
    IsMissing { column: String },
    /// Rendered cell text is one of `values`.
    InSet { column: String, values: Vec<String> },
    Custom(Arc<dyn Fn(&RowView<'_>) -> bool + Send + Sync>),
}

impl RowFilter {
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn is_missing(column: impl Into<String>) -> Self {
        Self::IsMissing {
            column: column.into(),
        }
    }

    pub fn in_set<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::InSet {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&RowView<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Column the filter reads, if it names one.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Equals { column, .. }
            | Self::IsMissing { column }
            | Self::InSet { column, .. } => Some(column),
            Self::Custom(_) => None,
        }
    }
}

impl RowPredicate for RowFilter {
    fn matches(&self, row: &RowView<'_>) -> bool {
        match self {
            Self::Equals { column, value } => row.text(column).is_some_and(|text| &text == value),
            Self::IsMissing { column } => row.get(column).is_some_and(|cell| cell.is_missing()),
            Self::InSet { column, values } => row
                .text(column)
                .is_some_and(|text| values.iter().any(|v| *v == text)),
            Self::Custom(predicate) => predicate(row),
        }
    }
}

impl RowPredicate for [RowFilter] {
    /// Conjunction of every filter; an empty list matches all rows.
    fn matches(&self, row: &RowView<'_>) -> bool {
        self.iter().all(|filter| filter.matches(row))
    }
}

impl fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { column, value } => f
                .debug_struct("Equals")
                .field("column", column)
                .field("value", value)
                .finish(),
            Self::IsMissing { column } => {
                f.debug_struct("IsMissing").field("column", column).finish()
            }
            Self::InSet { column, values } => f
                .debug_struct("InSet")
                .field("column", column)
                .field("values", values)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
