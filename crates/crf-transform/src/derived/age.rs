//! Age at the normalizer's current date.

use chrono::{Datelike, NaiveDate};
use crf_model::{Cell, Column, ImputeBias, Table};

use crate::columns::push_column;
use crate::datetime::DateNormalizer;
use crate::numeric::cell_i64;

/// Age by year subtraction only; `None` when the birth year is too far out
/// of range to subtract.
pub fn age_from_birth_year(birth_year: i64, today: NaiveDate) -> Option<i64> {
    i64::from(today.year()).checked_sub(birth_year)
}

/// Age in completed years; one less if the birthday has not come yet this
/// year.
pub fn age_from_birth_date(birth: NaiveDate, today: NaiveDate) -> i64 {
    let before_birthday = (today.month(), today.day()) < (birth.month(), birth.day());
    i64::from(today.year() - birth.year()) - i64::from(before_birthday)
}

/// Adds `output` with ages computed from a birth-year column.
pub fn add_age_from_birth_year(
    table: Table,
    normalizer: &DateNormalizer,
    column: &str,
    output: &str,
) -> Table {
    add_age(table, column, output, |cell| {
        cell_i64(cell).and_then(|year| age_from_birth_year(year, normalizer.today()))
    })
}

/// Adds `output` with ages computed from a birth-date column.
///
/// Birth dates go through the single-value fallback parser.
pub fn add_age_from_birth_date(
    table: Table,
    normalizer: &DateNormalizer,
    column: &str,
    output: &str,
) -> Table {
    add_age(table, column, output, |cell| {
        normalizer
            .parse_cell(cell, ImputeBias::Start)
            .as_date()
            .map(|birth| age_from_birth_date(birth, normalizer.today()))
    })
}

fn add_age(
    table: Table,
    column: &str,
    output: &str,
    age: impl Fn(&Cell) -> Option<i64>,
) -> Table {
    let Some(source) = table.column(column) else {
        tracing::error!(column, "birth column not found");
        return table;
    };
    let mut failed = 0;
    let values: Vec<Cell> = source
        .values
        .iter()
        .map(|cell| {
            if cell.is_blank() {
                return Cell::Missing;
            }
            age(cell).map_or_else(
                || {
                    failed += 1;
                    Cell::Missing
                },
                Cell::Int,
            )
        })
        .collect();
    if failed > 0 {
        tracing::error!(column, failed, "wrong birth date format");
    }
    push_column(table, Column::new(output, values))
}
