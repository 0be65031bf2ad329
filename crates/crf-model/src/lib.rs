pub mod cell;
pub mod error;
pub mod join;
pub mod options;
pub mod predicate;
pub mod row;
pub mod source;
pub mod table;
pub mod unpivot;

pub use cell::{Cell, format_numeric};
pub use error::{ModelError, Result};
pub use join::{ColumnSelection, DEFAULT_JOIN_SUFFIX, JoinHow, JoinKeys, JoinSpec};
pub use options::{DateOptions, ImputeBias};
pub use predicate::{RowFilter, RowPredicate};
pub use row::RowView;
pub use source::TableSource;
pub use table::{Column, Table};
pub use unpivot::{AttributeSource, UnpivotColumnConfig, UnpivotSpec};
