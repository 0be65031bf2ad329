use crate::cell::Cell;
use crate::table::Table;

/// Borrowed view of one table row with access by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    pub(crate) fn new(table: &'a Table, index: usize) -> Self {
        Self { table, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Cell in the named column; `None` if the column does not exist.
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table.get(column, self.index)
    }

    /// Rendered text of a present, non-missing cell.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Cell::key)
    }
}
