//! Read-only table → column-name mapping used to resolve bare field names.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub trait SchemaCatalog: Send + Sync {
    /// Column names of `table`, lowercased. `None` when the catalog does not
    /// know the table.
    fn columns_of(&self, table: &str) -> Option<&BTreeSet<String>>;
}

/// An in-memory catalog snapshot.
///
/// Table and column names are stored lowercased, so lookups are
/// case-insensitive regardless of how the source database reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeSet<String>>", into = "BTreeMap<String, BTreeSet<String>>")]
pub struct StaticCatalog {
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table<I, S>(mut self, table: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert_table(table, columns);
        self
    }

    pub fn insert_table<I, S>(&mut self, table: &str, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|c| c.as_ref().to_lowercase())
            .collect();
        self.tables.insert(table.to_lowercase(), columns);
    }
}

impl SchemaCatalog for StaticCatalog {
    fn columns_of(&self, table: &str) -> Option<&BTreeSet<String>> {
        self.tables.get(&table.to_lowercase())
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for StaticCatalog {
    fn from(tables: BTreeMap<String, BTreeSet<String>>) -> Self {
        tables
            .into_iter()
            .fold(StaticCatalog::new(), |catalog, (table, columns)| {
                catalog.with_table(&table, columns)
            })
    }
}

impl From<StaticCatalog> for BTreeMap<String, BTreeSet<String>> {
    fn from(catalog: StaticCatalog) -> Self {
        catalog.tables
    }
}
