//! Named tables.

use crf_model::{Cell, JoinSpec, Table};

use crate::columns::{CollisionMode, add_constant_column};
use crate::error::{Result, TransformError};
use crate::join::join_named;
use crate::values::{IdentifierColumns, add_usubjid};

/// A table tagged with its domain code.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainFrame {
    /// Domain code (e.g., "AE", "DM").
    pub domain_code: String,

    pub data: Table,
}

impl DomainFrame {
    pub fn new(domain_code: impl Into<String>, data: Table) -> Self {
        Self {
            domain_code: domain_code.into(),
            data,
        }
    }

    /// Output file stem.
    pub fn dataset_name(&self) -> &str {
        &self.domain_code
    }

    pub fn row_count(&self) -> usize {
        self.data.height()
    }

    /// Joins `right` onto this frame; the row-count diagnostic names both
    /// frames.
    pub fn join(self, right: &DomainFrame, spec: &JoinSpec) -> Result<Self> {
        let data = join_named(self.data, &right.data, spec, &self.domain_code, &right.domain_code)?;
        Ok(Self {
            domain_code: self.domain_code,
            data,
        })
    }

    /// Joins a bare table, named `N/A` in diagnostics.
    pub fn join_table(self, right: &Table, spec: &JoinSpec) -> Result<Self> {
        let data = join_named(self.data, right, spec, &self.domain_code, "N/A")?;
        Ok(Self {
            domain_code: self.domain_code,
            data,
        })
    }

    /// Stacks frames row-wise under the first frame's code.
    pub fn union(frames: Vec<DomainFrame>) -> Result<Self> {
        let Some(first) = frames.first() else {
            return Err(TransformError::EmptyUnion);
        };
        let domain_code = first.domain_code.clone();
        let parts: Vec<Table> = frames.into_iter().map(|frame| frame.data).collect();
        Ok(Self {
            domain_code,
            data: Table::concat(&parts),
        })
    }

    /// Sets `STUDYID` and `DOMAIN`, then builds `USUBJID`.
    pub fn add_identifiers(self, study_id: &str) -> Self {
        let columns = IdentifierColumns::default();
        let data = add_constant_column(
            self.data,
            &columns.study_id,
            &Cell::text(study_id),
            CollisionMode::Overwrite,
        );
        let data = add_constant_column(
            data,
            "DOMAIN",
            &Cell::text(self.domain_code.as_str()),
            CollisionMode::Overwrite,
        );
        Self {
            data: add_usubjid(data, &columns),
            domain_code: self.domain_code,
        }
    }
}
