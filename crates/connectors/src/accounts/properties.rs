use crate::{accounts::error::AccountsError, sql::base::adapter::SqlAdapter};
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use planner::{
    properties::{PropertyPlan, SourcePlan},
    query::renderer::render_parameterized,
};
use std::{
    collections::{HashMap, HashSet},
    time::Instant,
};
use tracing::{debug, info};

const OUTPUT_ENTITY: &str = "account_properties";

/// Reads the planned columns for `acct_ids`.
///
/// Ids are deduplicated (first occurrence wins) and processed in chunks of
/// `plan.chunk_size`. Source rows are left-merged onto the anchor rows by
/// link value: an anchor row with no match gets NULLs, one with several
/// matches yields one output row per match. Identical output rows are
/// dropped.
pub async fn fetch_properties(
    adapter: &dyn SqlAdapter,
    plan: &PropertyPlan,
    acct_ids: &[Value],
) -> Result<Vec<RowData>, AccountsError> {
    let start = Instant::now();
    let mut seen_ids = HashSet::new();
    let ids: Vec<Value> = acct_ids
        .iter()
        .filter(|id| seen_ids.insert(*id))
        .cloned()
        .collect();

    let header = plan.output_columns();
    let anchor_key = &plan.anchor().source.key;
    let mut seen_rows = HashSet::new();
    let mut output = Vec::new();

    for (chunk_index, chunk) in ids.chunks(plan.chunk_size).enumerate() {
        debug!("Fetching properties chunk {} ({} ids)", chunk_index, chunk.len());
        let anchor_rows = query_source(adapter, plan.anchor(), chunk, plan.chunk_size).await?;

        let mut indexes = Vec::with_capacity(plan.sources.len().saturating_sub(1));
        for source in plan.sources.iter().skip(1) {
            let mut seen_links = HashSet::new();
            let links: Vec<Value> = anchor_rows
                .iter()
                .map(|row| row.get_value(&source.source.link))
                .filter(|link| !link.is_null() && seen_links.insert(link.clone()))
                .collect();

            let mut index: HashMap<Value, Vec<RowData>> = HashMap::new();
            for row in query_source(adapter, source, &links, plan.chunk_size).await? {
                index
                    .entry(row.get_value(&source.source.key))
                    .or_default()
                    .push(row);
            }
            indexes.push(index);
        }

        for anchor in &anchor_rows {
            for combo in merge(plan, anchor, &indexes) {
                let mut fields = Vec::with_capacity(header.len());
                fields.push(FieldValue {
                    name: header[0].clone(),
                    value: Some(anchor.get_value(anchor_key)),
                });
                for (column, name) in plan.columns.iter().zip(header.iter().skip(1)) {
                    let value = combo[column.source]
                        .map(|row| row.get_value(&column.name))
                        .unwrap_or(Value::Null);
                    fields.push(FieldValue {
                        name: name.clone(),
                        value: Some(value),
                    });
                }

                let row = RowData::new(OUTPUT_ENTITY, fields);
                if seen_rows.insert(row.clone()) {
                    output.push(row);
                }
            }
        }
    }

    info!(
        "Fetched {} property rows for {} accounts in {:?}",
        output.len(),
        ids.len(),
        start.elapsed()
    );
    Ok(output)
}

/// Every combination of matching source rows for one anchor row; `combo[i]`
/// is the row of `plan.sources[i]`.
fn merge<'r>(
    plan: &PropertyPlan,
    anchor: &'r RowData,
    indexes: &'r [HashMap<Value, Vec<RowData>>],
) -> Vec<Vec<Option<&'r RowData>>> {
    let mut combos = vec![vec![Some(anchor)]];
    for (source, index) in plan.sources.iter().skip(1).zip(indexes) {
        let link = anchor.get_value(&source.source.link);
        let matches = if link.is_null() { None } else { index.get(&link) };
        combos = match matches {
            Some(rows) => combos
                .into_iter()
                .flat_map(|combo| {
                    rows.iter().map(move |row| {
                        let mut combo = combo.clone();
                        combo.push(Some(row));
                        combo
                    })
                })
                .collect(),
            None => combos
                .into_iter()
                .map(|mut combo| {
                    combo.push(None);
                    combo
                })
                .collect(),
        };
    }
    combos
}

async fn query_source(
    adapter: &dyn SqlAdapter,
    source: &SourcePlan,
    keys: &[Value],
    chunk_size: usize,
) -> Result<Vec<RowData>, AccountsError> {
    let mut rows = Vec::new();
    for chunk in keys.chunks(chunk_size) {
        let select = source.select_for(chunk);
        let (sql, params) = render_parameterized(&select, adapter.dialect());
        rows.extend(adapter.query_rows(&sql, params).await?);
    }
    debug!("Read {} rows from {}", rows.len(), source.source.table);
    Ok(rows)
}
