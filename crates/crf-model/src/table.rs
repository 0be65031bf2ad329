//! Column-oriented in-memory table.

use std::collections::HashSet;

use crate::cell::Cell;
use crate::error::{ModelError, Result};
use crate::row::RowView;

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column of `len` copies of one value.
    pub fn constant(name: impl Into<String>, value: &Cell, len: usize) -> Self {
        Self::new(name, vec![value.clone(); len])
    }

    /// Column built from text values; `None` becomes missing.
    pub fn from_text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values
            .into_iter()
            .map(|value| value.map_or(Cell::Missing, |v| Cell::Text(v.into())))
            .collect();
        Self::new(name, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered set of uniquely-named, equal-length columns.
///
/// Rows have no identity beyond their position. Every transform takes a
/// table by value or reference and returns a new table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Builds a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ModelError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != height {
                return Err(ModelError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self { columns, height })
    }

    /// Empty table with the given height and no columns.
    pub fn with_height(height: usize) -> Self {
        Self {
            columns: Vec::new(),
            height,
        }
    }

    /// Builds a table from a header and row-major cells.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns: Vec<Column> = names
            .iter()
            .map(|name| Column::new(name.as_ref(), Vec::with_capacity(rows.len())))
            .collect();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ModelError::InvalidConfig(format!(
                    "row {index} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.values.push(cell);
            }
        }
        Self::new(columns)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Values of a column, or `ColumnNotFound`.
    pub fn values(&self, name: &str) -> Result<&[Cell]> {
        self.column(name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str, row: usize) -> Option<&Cell> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Replaces the column with the same name in place, or appends it.
    pub fn with_column(&mut self, column: Column) -> Result<()> {
        if self.columns.is_empty() && self.height == 0 {
            self.height = column.len();
        }
        if column.len() != self.height {
            return Err(ModelError::ColumnLengthMismatch {
                column: column.name,
                expected: self.height,
                actual: column.values.len(),
            });
        }
        match self.position(&column.name) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    /// Removes a column if present.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let index = self.position(name)?;
        Some(self.columns.remove(index))
    }

    /// Renames a column in place, keeping its position.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if self.contains(to) {
            return Err(ModelError::DuplicateColumn(to.to_string()));
        }
        let column = self
            .column_mut(from)
            .ok_or_else(|| ModelError::ColumnNotFound(from.to_string()))?;
        column.name = to.to_string();
        Ok(())
    }

    /// Applies `(from, to)` renames simultaneously.
    ///
    /// Absent sources are skipped. The table is left untouched if the result
    /// would contain a duplicate name.
    pub fn rename_many(&mut self, pairs: &[(&str, &str)]) -> Result<()> {
        let renamed: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                pairs
                    .iter()
                    .find(|(from, _)| *from == column.name)
                    .map_or_else(|| column.name.clone(), |(_, to)| (*to).to_string())
            })
            .collect();
        let mut seen = HashSet::new();
        for name in &renamed {
            if !seen.insert(name.as_str()) {
                return Err(ModelError::DuplicateColumn(name.clone()));
            }
        }
        for (column, name) in self.columns.iter_mut().zip(renamed) {
            column.name = name;
        }
        Ok(())
    }

    /// New table with the named columns in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self
                .column(name)
                .ok_or_else(|| ModelError::ColumnNotFound(name.to_string()))?;
            columns.push(column.clone());
        }
        let mut table = Self::new(columns)?;
        table.height = self.height;
        Ok(table)
    }

    /// New table with the rows at `indices`; `None` yields a missing row.
    pub fn take(&self, indices: &[Option<usize>]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let values = indices
                    .iter()
                    .map(|index| {
                        index
                            .and_then(|i| column.values.get(i).cloned())
                            .unwrap_or_default()
                    })
                    .collect();
                Column::new(column.name.clone(), values)
            })
            .collect();
        Self {
            columns,
            height: indices.len(),
        }
    }

    /// Keeps the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Self {
        let indices: Vec<Option<usize>> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(index, _)| Some(index))
            .collect();
        self.take(&indices)
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        (index < self.height).then(|| RowView::new(self, index))
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.height).map(move |index| RowView::new(self, index))
    }

    /// Unions tables row-wise.
    ///
    /// Columns appear in first-seen order; a column absent from one part is
    /// padded with missing cells for that part's rows.
    pub fn concat(parts: &[Table]) -> Self {
        let mut names: Vec<&str> = Vec::new();
        for part in parts {
            for column in &part.columns {
                if !names.contains(&column.name.as_str()) {
                    names.push(&column.name);
                }
            }
        }
        let height = parts.iter().map(Table::height).sum();
        let columns = names
            .iter()
            .map(|name| {
                let mut values = Vec::with_capacity(height);
                for part in parts {
                    match part.column(name) {
                        Some(column) => values.extend(column.values.iter().cloned()),
                        None => values.resize(values.len() + part.height, Cell::Missing),
                    }
                }
                Column::new(*name, values)
            })
            .collect();
        Self { columns, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec![
            Column::from_text("ID", [Some("1"), Some("2")]),
            Column::from_text("VAL", [Some("a"), None::<&str>]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let err = Table::new(vec![
            Column::from_text("A", [Some("1")]),
            Column::from_text("B", [Some("1"), Some("2")]),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::ColumnLengthMismatch { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = Table::new(vec![
            Column::from_text("A", [Some("1")]),
            Column::from_text("A", [Some("2")]),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateColumn(name) if name == "A"));
    }

    #[test]
    fn concat_pads_absent_columns() {
        let left = sample();
        let right = Table::new(vec![
            Column::from_text("ID", [Some("3")]),
            Column::from_text("EXTRA", [Some("x")]),
        ])
        .unwrap();
        let union = Table::concat(&[left, right]);
        assert_eq!(union.height(), 3);
        assert_eq!(union.column_names(), vec!["ID", "VAL", "EXTRA"]);
        assert_eq!(union.get("VAL", 2), Some(&Cell::Missing));
        assert_eq!(union.get("EXTRA", 0), Some(&Cell::Missing));
        assert_eq!(union.get("EXTRA", 2), Some(&Cell::text("x")));
    }

    #[test]
    fn take_with_none_yields_missing_row() {
        let table = sample().take(&[Some(1), None]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.get("ID", 0), Some(&Cell::text("2")));
        assert_eq!(table.get("ID", 1), Some(&Cell::Missing));
    }

    #[test]
    fn rename_keeps_position() {
        let mut table = sample();
        table.rename_column("ID", "SUBJID").unwrap();
        assert_eq!(table.column_names(), vec!["SUBJID", "VAL"]);
    }
}
