//! Builds a [`StaticCatalog`] from live database metadata.

use crate::sql::base::{adapter::SqlAdapter, error::DbError};
use planner::{catalog::StaticCatalog, properties::PropertyLayout, schema::AccountSchema};
use tracing::{info, warn};

/// A table to introspect: `(schema, name)`.
pub type TableName<'a> = (Option<&'a str>, &'a str);

/// Introspects `tables` one by one. Tables that do not exist are left out of
/// the catalog, so lookups against them fail at compile time.
pub async fn load_catalog<'a, I>(
    adapter: &dyn SqlAdapter,
    tables: I,
) -> Result<StaticCatalog, DbError>
where
    I: IntoIterator<Item = TableName<'a>>,
{
    let mut catalog = StaticCatalog::new();
    for (schema, table) in tables {
        let columns = adapter.table_columns(schema, table).await?;
        if columns.is_empty() {
            warn!("Table {} not found while loading the catalog", table);
            continue;
        }
        info!("Loaded {} columns for {}", columns.len(), table);
        catalog.insert_table(table, columns);
    }
    Ok(catalog)
}

/// The three tables the account filter resolves fields against.
pub fn account_tables(schema: &AccountSchema) -> Vec<TableName<'_>> {
    schema
        .tables()
        .map(|(_, spec)| (spec.schema.as_deref(), spec.name.as_str()))
        .collect()
}

/// Every source and bridge table of a property layout.
pub fn property_tables(layout: &PropertyLayout) -> Vec<TableName<'_>> {
    let mut tables = Vec::new();
    for source in layout.all_sources() {
        tables.push((source.schema.as_deref(), source.table.as_str()));
        if let Some(bridge) = &source.bridge {
            tables.push((bridge.schema.as_deref(), bridge.table.as_str()));
        }
    }
    tables
}
