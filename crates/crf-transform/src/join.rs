//! Filtered left join of a table against a reference table.
//!
//! Right rows are filtered first, then matched through a key index built over
//! the right key columns. The right key columns never reach the output, so no
//! disambiguation suffix has to be stripped afterwards.

use std::collections::HashMap;

use crf_model::{Cell, Column, JoinHow, JoinSpec, RowPredicate, Table};

use crate::error::{Result, TransformError};

/// Joins `right` onto `left` as described by `spec`.
///
/// Missing keys never match. Every left column is kept; selected right
/// columns are appended, suffixed when their target name already exists on
/// the left (or replacing the left column when the suffix is empty).
pub fn join(left: Table, right: &Table, spec: &JoinSpec) -> Result<Table> {
    join_named(left, right, spec, "N/A", "N/A")
}

pub(crate) fn join_named(
    left: Table,
    right: &Table,
    spec: &JoinSpec,
    left_name: &str,
    right_name: &str,
) -> Result<Table> {
    let left_keys = spec.keys.left();
    let right_keys = spec.keys.right();
    check_keys(&left, left_keys, "left")?;
    check_keys(right, right_keys, "right")?;

    for filter in &spec.right_filter {
        if let Some(column) = filter.column()
            && !right.contains(column)
        {
            tracing::warn!(column, table = right_name, "right filter column not found");
        }
    }

    let selected: Vec<(&str, &str)> = spec.columns.pairs();
    let (hit, miss): (Vec<_>, Vec<_>) = selected
        .into_iter()
        .partition(|(source, _)| right.contains(source));
    if !miss.is_empty() {
        let absent: Vec<&str> = miss.iter().map(|(source, _)| *source).collect();
        tracing::warn!(
            columns = %absent.join(", "),
            "the requested columns are absent in the joined data"
        );
    }

    let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
    for row in right.rows() {
        if !spec.right_filter[..].matches(&row) {
            continue;
        }
        if let Some(key) = row_key(right, right_keys, row.index()) {
            index.entry(key).or_default().push(row.index());
        }
    }

    let mut left_rows = Vec::with_capacity(left.height());
    let mut right_rows = Vec::with_capacity(left.height());
    for row in 0..left.height() {
        match row_key(&left, left_keys, row).and_then(|key| index.get(&key)) {
            Some(matches) => {
                for &matched in matches {
                    left_rows.push(Some(row));
                    right_rows.push(Some(matched));
                }
            }
            None if spec.how == JoinHow::Left => {
                left_rows.push(Some(row));
                right_rows.push(None);
            }
            None => {}
        }
    }

    let mut result = left.take(&left_rows);
    for (source, target) in hit {
        let Some(column) = right.column(source) else {
            continue;
        };
        let values: Vec<Cell> = right_rows
            .iter()
            .map(|index| {
                index
                    .and_then(|i| column.values.get(i).cloned())
                    .unwrap_or_default()
            })
            .collect();
        let name = if left.contains(target) {
            if spec.suffix.is_empty() {
                result.drop_column(target);
                tracing::warn!(column = target, "column was replaced by joined column");
                target.to_string()
            } else {
                format!("{target}{}", spec.suffix)
            }
        } else {
            target.to_string()
        };
        if result.contains(&name) {
            tracing::warn!(column = %name, "column was replaced by joined column");
        }
        result.with_column(Column::new(name, values))?;
    }

    if result.height() != left.height() {
        tracing::warn!(
            left = left_name,
            right = right_name,
            before = left.height(),
            after = result.height(),
            "After joining \"{left_name}\" (left) and \"{right_name}\" (right): Row count changed from {} to {}.",
            left.height(),
            result.height()
        );
    }
    Ok(result)
}

fn check_keys(table: &Table, keys: &[String], side: &'static str) -> Result<()> {
    match keys.iter().find(|key| !table.contains(key)) {
        Some(column) => Err(TransformError::MissingJoinKey {
            column: column.clone(),
            side,
        }),
        None => Ok(()),
    }
}

/// Rendered key of one row; `None` if any key cell is missing.
fn row_key(table: &Table, keys: &[String], row: usize) -> Option<Vec<String>> {
    keys.iter()
        .map(|key| table.get(key, row).and_then(Cell::key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left() -> Table {
        Table::new(vec![
            Column::from_text("ID", [Some("1"), Some("2"), Some("3")]),
            Column::from_text("AGE", [Some("30"), Some("40"), Some("50")]),
        ])
        .unwrap()
    }

    fn right() -> Table {
        Table::new(vec![
            Column::from_text("PID", [Some("1"), Some("2"), Some("2"), None]),
            Column::from_text("VISIT", [Some("SCR"), Some("SCR"), Some("W1"), Some("SCR")]),
            Column::from_text("AGE", [Some("31"), Some("41"), Some("42"), Some("99")]),
            Column::from_text("SEX", [Some("F"), Some("M"), Some("M"), Some("F")]),
        ])
        .unwrap()
    }

    #[test]
    fn distinct_keys_filter_and_suffix() {
        let spec = JoinSpec::on_distinct(["ID"], ["PID"])
            .keep(["AGE", "SEX"])
            .filter_eq("VISIT", "SCR");
        let result = join(left(), &right(), &spec).unwrap();
        assert_eq!(result.height(), 3);
        assert_eq!(result.column_names(), vec!["ID", "AGE", "AGE_JOIN", "SEX"]);
        assert_eq!(
            result.values("AGE_JOIN").unwrap(),
            &[Cell::text("31"), Cell::text("41"), Cell::Missing]
        );
        assert!(!result.contains("PID"));
    }

    #[test]
    fn empty_suffix_overwrites_left_column() {
        let spec = JoinSpec::on_distinct(["ID"], ["PID"])
            .keep(["AGE"])
            .filter_eq("VISIT", "SCR")
            .suffix("");
        let result = join(left(), &right(), &spec).unwrap();
        assert_eq!(result.column_names(), vec!["ID", "AGE"]);
        assert_eq!(
            result.values("AGE").unwrap(),
            &[Cell::text("31"), Cell::text("41"), Cell::Missing]
        );
    }

    #[test]
    fn rename_mapping_applies_collision_rule() {
        let spec = JoinSpec::on_distinct(["ID"], ["PID"])
            .rename([("SEX", "GENDER"), ("AGE", "AGE")])
            .filter_eq("VISIT", "SCR");
        let result = join(left(), &right(), &spec).unwrap();
        assert_eq!(result.column_names(), vec!["ID", "AGE", "GENDER", "AGE_JOIN"]);
    }

    #[test]
    fn inner_join_drops_unmatched() {
        let spec = JoinSpec::on_distinct(["ID"], ["PID"])
            .keep(["SEX"])
            .filter_eq("VISIT", "SCR")
            .how(JoinHow::Inner);
        let result = join(left(), &right(), &spec).unwrap();
        assert_eq!(result.values("ID").unwrap(), &[Cell::text("1"), Cell::text("2")]);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let spec = JoinSpec::on(["NOPE"]).keep(["SEX"]);
        let err = join(left(), &right(), &spec).unwrap_err();
        assert!(matches!(err, TransformError::MissingJoinKey { side: "left", .. }));
    }
}
