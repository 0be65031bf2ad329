use crate::table::Table;

/// Loads named tables for the transform stages.
pub trait TableSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load(&self, name: &str) -> Result<Table, Self::Error>;
}
