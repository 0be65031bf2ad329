use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("column not found: {0}")]
    ColumnNotFound(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
