//! Day differences between two date columns.

use chrono::NaiveDateTime;
use crf_model::{Cell, Column, Table};

use super::endpoint;
use crate::columns::push_column;
use crate::datetime::DateNormalizer;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `start` to `end`, rounded toward negative infinity.
pub fn day_delta(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Adds `output` = `end - start` in days.
///
/// Both endpoints go through the single-value fallback parser; a missing or
/// unparseable endpoint gives a missing duration.
pub fn add_duration(
    table: Table,
    normalizer: &DateNormalizer,
    start: &str,
    end: &str,
    output: &str,
) -> Table {
    let (Some(starts), Some(ends)) = (table.column(start), table.column(end)) else {
        tracing::error!(start, end, "duration endpoint column not found");
        return table;
    };
    let values: Vec<Cell> = starts
        .values
        .iter()
        .zip(&ends.values)
        .map(|(s, e)| match (endpoint(normalizer, s), endpoint(normalizer, e)) {
            (Some(s), Some(e)) => Cell::Int(day_delta(s, e)),
            _ => Cell::Missing,
        })
        .collect();
    push_column(table, Column::new(output, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_day_delta_floors() {
        assert_eq!(day_delta(at(2020, 1, 10, 0), at(2020, 1, 12, 0)), 2);
        assert_eq!(day_delta(at(2020, 1, 10, 12), at(2020, 1, 10, 6)), -1);
        assert_eq!(day_delta(at(2020, 1, 10, 6), at(2020, 1, 10, 12)), 0);
    }

    #[test]
    fn test_add_duration() {
        let normalizer =
            DateNormalizer::new().with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        let table = Table::new(vec![
            Column::from_text("AESTDTC", [Some("2020-01-10"), Some("2020-01-10"), None]),
            Column::from_text("AEENDTC", [Some("2020-01-15"), Some("garbage"), Some("2020-01-01")]),
        ])
        .unwrap();
        let table = add_duration(table, &normalizer, "AESTDTC", "AEENDTC", "AEDUR");
        assert_eq!(
            table.values("AEDUR").unwrap(),
            &[Cell::Int(5), Cell::Missing, Cell::Missing]
        );
    }

    #[test]
    fn test_add_duration_may_be_negative() {
        let normalizer = DateNormalizer::new();
        let table = Table::new(vec![
            Column::from_text("START", [Some("2020-01-10")]),
            Column::from_text("END", [Some("2020-01-07")]),
        ])
        .unwrap();
        let table = add_duration(table, &normalizer, "START", "END", "DUR");
        assert_eq!(table.get("DUR", 0), Some(&Cell::Int(-3)));
    }
}
