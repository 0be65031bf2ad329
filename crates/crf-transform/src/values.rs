//! Row filtering and per-value column operators.

use crf_model::{Cell, Column, RowPredicate, Table};
use serde::{Deserialize, Serialize};

use crate::columns::push_column;
use crate::numeric::{cell_f64, round_to};

/// Keeps the rows matching `predicate`. Empty tables pass through.
pub fn filter_rows<P: RowPredicate + ?Sized>(table: Table, predicate: &P) -> Table {
    if table.is_empty() {
        return table;
    }
    let mask: Vec<bool> = table.rows().map(|row| predicate.matches(&row)).collect();
    table.filter(&mask)
}

/// Sets `value` in `output` where `predicate` holds.
///
/// Other rows take `default` when given, otherwise keep their previous value
/// (missing if `output` is new).
pub fn add_conditional_value<P: RowPredicate + ?Sized>(
    table: Table,
    value: &Cell,
    predicate: &P,
    output: &str,
    default: Option<&Cell>,
) -> Table {
    let previous = table.column(output).map(|c| c.values.as_slice());
    let values: Vec<Cell> = table
        .rows()
        .map(|row| {
            if predicate.matches(&row) {
                value.clone()
            } else if let Some(default) = default {
                default.clone()
            } else {
                previous
                    .and_then(|values| values.get(row.index()).cloned())
                    .unwrap_or_default()
            }
        })
        .collect();
    push_column(table, Column::new(output, values))
}

fn map_text(
    table: Table,
    input: &str,
    output: Option<&str>,
    f: impl Fn(&str) -> Option<String>,
) -> Table {
    let Some(source) = table.column(input) else {
        tracing::error!(column = input, "input column not found");
        return table;
    };
    let values: Vec<Cell> = source
        .values
        .iter()
        .map(|cell| match cell {
            Cell::Missing => Cell::Missing,
            other => f(&other.to_string()).map_or(Cell::Missing, Cell::Text),
        })
        .collect();
    push_column(table, Column::new(output.unwrap_or(input), values))
}

/// Uppercases the text form of every present value.
pub fn to_uppercase(table: Table, input: &str, output: Option<&str>) -> Table {
    map_text(table, input, output, |text| Some(text.to_uppercase()))
}

/// Character slice `[start, end)` of every present value; `end = None`
/// runs to the end of the value.
pub fn substring(table: Table, input: &str, output: Option<&str>, start: usize, end: Option<usize>) -> Table {
    map_text(table, input, output, |text| {
        let len = end.map_or(usize::MAX, |end| end.saturating_sub(start));
        Some(text.chars().skip(start).take(len).collect())
    })
}

/// Part `part` of every value split on `delimiter`; missing when the value
/// has fewer parts.
pub fn split_column(table: Table, input: &str, output: &str, delimiter: &str, part: usize) -> Table {
    let table = map_text(table, input, Some(output), |text| {
        text.split(delimiter).nth(part).map(str::to_string)
    });
    if input != output
        && let (Some(a), Some(b)) = (table.column(input), table.column(output))
        && a.values == b.values
    {
        tracing::error!(input, output, "input and output columns are the same after splitting");
    }
    table
}

/// `numerator / denominator` rounded to `decimals`; non-numeric operands and
/// zero denominators give missing.
pub fn compute_ratio(table: Table, numerator: &str, denominator: &str, output: &str, decimals: u32) -> Table {
    let (Some(num), Some(den)) = (table.column(numerator), table.column(denominator)) else {
        tracing::error!(numerator, denominator, "ratio operand column not found");
        return table;
    };
    let values: Vec<Cell> = num
        .values
        .iter()
        .zip(&den.values)
        .map(|(n, d)| match (cell_f64(n), cell_f64(d)) {
            (Some(n), Some(d)) if d != 0.0 => Cell::Float(round_to(n / d, decimals)),
            _ => Cell::Missing,
        })
        .collect();
    push_column(table, Column::new(output, values))
}

/// Column names used to build the unique subject identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierColumns {
    pub study_id: String,
    pub site_id: String,
    pub subject_id: String,
    pub usubjid: String,
}

impl Default for IdentifierColumns {
    fn default() -> Self {
        Self {
            study_id: "STUDYID".to_string(),
            site_id: "SITEID".to_string(),
            subject_id: "SUBJID".to_string(),
            usubjid: "USUBJID".to_string(),
        }
    }
}

/// Adds `STUDYID-SITEID-SUBJID`, or `STUDYID-SUBJID` when the table has no
/// site column. Rows with a missing part get a missing identifier.
pub fn add_usubjid(table: Table, columns: &IdentifierColumns) -> Table {
    if !table.contains(&columns.study_id) || !table.contains(&columns.subject_id) {
        tracing::error!(
            study_id = %columns.study_id,
            subject_id = %columns.subject_id,
            "identifier columns not found"
        );
        return table;
    }
    let mut parts = vec![columns.study_id.as_str()];
    if table.contains(&columns.site_id) {
        parts.push(&columns.site_id);
    }
    parts.push(&columns.subject_id);

    let values: Vec<Cell> = table
        .rows()
        .map(|row| {
            parts
                .iter()
                .map(|name| row.text(name))
                .collect::<Option<Vec<String>>>()
                .map_or(Cell::Missing, |parts| Cell::Text(parts.join("-")))
        })
        .collect();
    push_column(table, Column::new(columns.usubjid.as_str(), values))
}
