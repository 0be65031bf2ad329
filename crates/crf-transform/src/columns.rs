//! Column renaming, creation, removal, and value remapping.

use crf_model::{Cell, Column, Table};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What to do when an operation would create a column that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Replace the existing column and log a warning.
    #[default]
    Overwrite,
    /// Leave the existing column alone.
    Preserve,
}

/// Value dictionary for [`map_values`]; the `None` key matches missing cells.
pub type ValueMap = IndexMap<Option<String>, Cell>;

/// Renames columns by `old -> new` pairs.
///
/// Identity entries and absent sources are skipped silently. A destination
/// that already exists on a column not being renamed away is a collision:
/// `Overwrite` drops that column first, `Preserve` aborts the whole batch.
pub fn rename_columns(mut table: Table, mapping: &IndexMap<String, String>, mode: CollisionMode) -> Table {
    let pairs: Vec<(&str, &str)> = mapping
        .iter()
        .filter(|(from, to)| from != to && table.contains(from))
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect();
    if pairs.is_empty() {
        return table;
    }

    let clashing: Vec<String> = pairs
        .iter()
        .map(|(_, to)| *to)
        .filter(|to| table.contains(to) && !pairs.iter().any(|(from, _)| from == to))
        .map(str::to_string)
        .collect();

    if !clashing.is_empty() {
        match mode {
            CollisionMode::Preserve => {
                tracing::error!(
                    columns = ?clashing,
                    "columns clash during rename; rename skipped"
                );
                return table;
            }
            CollisionMode::Overwrite => {
                let original = table.clone();
                for name in &clashing {
                    table.drop_column(name);
                }
                tracing::warn!(columns = ?clashing, "columns were replaced by column rename");
                if let Err(err) = table.rename_many(&pairs) {
                    tracing::error!(%err, "rename skipped");
                    return original;
                }
                return table;
            }
        }
    }

    if let Err(err) = table.rename_many(&pairs) {
        tracing::error!(%err, "rename skipped");
    }
    table
}

/// Adds a column holding `value` on every row.
///
/// An existing column of that name is replaced under `Overwrite`; under
/// `Preserve` the value goes to `<name>_1` instead.
pub fn add_constant_column(mut table: Table, name: &str, value: &Cell, mode: CollisionMode) -> Table {
    let mut target = name.to_string();
    if table.contains(name) {
        match mode {
            CollisionMode::Overwrite => {
                table.drop_column(name);
                tracing::warn!(column = name, value = %value, "column was replaced by constant column");
            }
            CollisionMode::Preserve => target.push_str("_1"),
        }
    }
    let column = Column::constant(target, value, table.height());
    push_column(table, column)
}

/// Drops the named columns; unknown names are ignored.
pub fn drop_columns<S: AsRef<str>>(mut table: Table, names: &[S]) -> Table {
    for name in names {
        table.drop_column(name.as_ref());
    }
    table
}

/// Copies `(source, target)` columns.
pub fn copy_columns(mut table: Table, pairs: &[(&str, &str)]) -> Table {
    for (source, target) in pairs {
        let Some(column) = table.column(source) else {
            tracing::error!(column = source, "source column for copy not found");
            continue;
        };
        let copy = Column::new(*target, column.values.clone());
        table = push_column(table, copy);
    }
    table
}

/// Keeps exactly `names` in order; names not present become missing columns.
pub fn set_columns<S: AsRef<str>>(table: &Table, names: &[S]) -> Table {
    let mut result = Table::with_height(table.height());
    for name in names {
        let name = name.as_ref();
        let column = table
            .column(name)
            .cloned()
            .unwrap_or_else(|| Column::constant(name, &Cell::Missing, table.height()));
        result = push_column(result, column);
    }
    result
}

/// Replaces values through `dictionary`.
///
/// Unmatched cells take `default` when given and become missing otherwise.
/// The result goes to `output` (the source column when `None`). A remap
/// that changes nothing is logged at error level.
pub fn map_values(
    table: Table,
    column: &str,
    dictionary: &ValueMap,
    default: Option<&Cell>,
    output: Option<&str>,
) -> Table {
    let Some(source) = table.column(column) else {
        tracing::error!(column, "column to map not found");
        return table;
    };
    let values: Vec<Cell> = source
        .values
        .iter()
        .map(|cell| match dictionary.get(&cell.key()) {
            Some(mapped) => mapped.clone(),
            None => default.cloned().unwrap_or_default(),
        })
        .collect();
    if values == source.values {
        tracing::error!(column, "no values have been replaced");
    }
    let target = output.unwrap_or(column);
    push_column(table, Column::new(target, values))
}

/// Replaces or appends a column whose length matches the table.
pub(crate) fn push_column(mut table: Table, column: Column) -> Table {
    if let Err(err) = table.with_column(column) {
        tracing::error!(%err, "column not added");
    }
    table
}
