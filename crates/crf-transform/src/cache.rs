//! Read-through cache of loaded reference tables.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crf_model::{Table, TableSource};

use crate::error::{Result, TransformError};

/// Loads each named table once and keeps it for the life of the cache.
///
/// Entries are never invalidated; a table changed on disk after its first
/// load is not seen again.
#[derive(Debug)]
pub struct TableCache<S: TableSource> {
    source: S,
    tables: BTreeMap<String, Table>,
}

impl<S: TableSource> TableCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tables: BTreeMap::new(),
        }
    }

    /// Returns the cached table, loading it on first access.
    pub fn get(&mut self, name: &str) -> Result<&Table> {
        match self.tables.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let table = self.source.load(name).map_err(|source| TransformError::Load {
                    name: name.to_string(),
                    source: Box::new(source),
                })?;
                tracing::debug!(name, rows = table.height(), "table loaded");
                Ok(entry.insert(table))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
