//! Study day calculation.
//!
//! Study day is counted relative to a reference start date:
//! - on or after the reference: `(event - ref) + 1` (Day 1, 2, 3...)
//! - before the reference: `event - ref` (Day -1, -2, -3...)
//! - there is no day 0
//!
//! The same shift applies to study durations.

use chrono::NaiveDateTime;
use crf_model::{Cell, Column, Table};

use super::duration::day_delta;
use super::endpoint;
use crate::columns::push_column;
use crate::datetime::DateNormalizer;

/// Added to non-negative day offsets so the reference day is day 1.
pub const STUDY_DAY_FORWARD_SHIFT: i64 = 1;

/// Shifted day offset from `reference` to `event`.
///
/// ```
/// use chrono::NaiveDate;
/// use crf_transform::derived::calculate_study_day;
///
/// let reference = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let before = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// assert_eq!(calculate_study_day(reference, reference), 1);
/// assert_eq!(calculate_study_day(reference, before), -5);
/// ```
pub fn calculate_study_day(reference: NaiveDateTime, event: NaiveDateTime) -> i64 {
    let days = day_delta(reference, event);
    if days >= 0 {
        days + STUDY_DAY_FORWARD_SHIFT
    } else {
        days
    }
}

/// Adds `output` = shifted `end - start` for every row where both
/// endpoints parse; other rows get a missing value.
///
/// Returns the table and the number of rows whose non-missing endpoints
/// could not be parsed.
fn shifted_offsets(
    table: Table,
    normalizer: &DateNormalizer,
    start: &str,
    end: &str,
    output: &str,
) -> (Table, Option<usize>) {
    let (Some(starts), Some(ends)) = (table.column(start), table.column(end)) else {
        tracing::error!(start, end, "date column not found");
        return (table, None);
    };
    let mut failed = 0;
    let values: Vec<Cell> = starts
        .values
        .iter()
        .zip(&ends.values)
        .map(|(s, e)| match (endpoint(normalizer, s), endpoint(normalizer, e)) {
            (Some(s), Some(e)) => Cell::Int(calculate_study_day(s, e)),
            _ => {
                if !s.is_blank() && !e.is_blank() {
                    failed += 1;
                }
                Cell::Missing
            }
        })
        .collect();
    (push_column(table, Column::new(output, values)), Some(failed))
}

/// Adds a study day column for `dtc` relative to `reference`.
///
/// The output defaults to `dtc` with its `DTC` suffix replaced by `DY`
/// (`AESTDTC` gives `AESTDY`). Without an explicit `dy`, a column whose
/// name does not end in `DTC` is rejected.
pub fn add_study_day(
    table: Table,
    normalizer: &DateNormalizer,
    dtc: &str,
    dy: Option<&str>,
    reference: &str,
) -> Table {
    let output = match dy {
        Some(dy) => dy.to_string(),
        None => match dtc.strip_suffix("DTC") {
            Some(stem) => format!("{stem}DY"),
            None => {
                tracing::error!(column = dtc, "cannot derive study day column name");
                return table;
            }
        },
    };
    let (table, failed) = shifted_offsets(table, normalizer, reference, dtc, &output);
    if let Some(failed) = failed
        && failed > 0
    {
        tracing::error!(column = dtc, reference, failed, "study day could not be calculated");
    }
    table
}

/// Adds `output` = `end - start` in days with the study day shift.
pub fn add_study_duration(
    table: Table,
    normalizer: &DateNormalizer,
    start: &str,
    end: &str,
    output: &str,
) -> Table {
    shifted_offsets(table, normalizer, start, end, output).0
}
