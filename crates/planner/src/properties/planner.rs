use crate::{
    catalog::SchemaCatalog,
    properties::{
        error::PropertyError,
        layout::{BRIDGE_ALIAS, ComputedColumn, PropertyLayout, PropertySource, SOURCE_ALIAS},
    },
    query::{
        ast::{
            common::JoinKind,
            expr::{BinaryOperator, Expr},
            select::Select,
        },
        builder::select::SelectBuilder,
        qualified,
    },
    table_ref,
};
use model::core::value::Value;
use std::collections::BTreeSet;
use tracing::debug;

pub struct PropertyPlanner<'a> {
    catalog: &'a dyn SchemaCatalog,
    layout: &'a PropertyLayout,
}

/// The queries needed to gather a set of columns for a list of accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPlan {
    /// Requested columns, lowercased and deduplicated, in request order.
    pub columns: Vec<PlannedColumn>,
    /// `sources[0]` is the anchor; the rest are merged onto it in order.
    pub sources: Vec<SourcePlan>,
    pub chunk_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedColumn {
    pub name: String,
    /// Index into `PropertyPlan::sources`.
    pub source: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourcePlan {
    pub source: PropertySource,
    /// Columns read from the source table; the key always comes first.
    pub columns: Vec<String>,
    pub bridge_columns: Vec<String>,
    pub computed: Vec<ComputedColumn>,
    /// The key itself was requested, e.g. `sub_acct_id` of the hierarchy.
    pub key_requested: bool,
}

impl<'a> PropertyPlanner<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog, layout: &'a PropertyLayout) -> Self {
        Self { catalog, layout }
    }

    pub fn plan<S: AsRef<str>>(&self, columns: &[S]) -> Result<PropertyPlan, PropertyError> {
        if self.layout.chunk_size == 0 {
            return Err(PropertyError::InvalidLayout(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        let anchor_key = self.layout.anchor.key.to_lowercase();
        let mut requested = Vec::new();
        for column in columns {
            let column = column.as_ref().trim().to_lowercase();
            if column != anchor_key && !requested.contains(&column) {
                requested.push(column);
            }
        }

        let layout_sources: Vec<&PropertySource> = self.layout.all_sources().collect();
        let mut plans: Vec<SourcePlan> = layout_sources
            .iter()
            .map(|source| SourcePlan::empty(source))
            .collect();
        let mut attribution = Vec::with_capacity(requested.len());
        let mut unknown = Vec::new();

        'columns: for column in &requested {
            for (index, source) in layout_sources.iter().enumerate() {
                let plan = &mut plans[index];
                if self.table_has(&source.table, column)? {
                    if plan.columns[0] == *column {
                        plan.key_requested = true;
                    }
                    push_unique(&mut plan.columns, column);
                } else if source
                    .bridge
                    .as_ref()
                    .map(|bridge| self.table_has(&bridge.table, column))
                    .transpose()?
                    .unwrap_or(false)
                {
                    push_unique(&mut plan.bridge_columns, column);
                } else if let Some(computed) = source.computed_column(column) {
                    plan.computed.push(computed.clone());
                } else {
                    continue;
                }
                debug!("Property column `{}` read from {}", column, source.table);
                attribution.push((column.clone(), index));
                continue 'columns;
            }
            unknown.push(column.clone());
        }

        if !unknown.is_empty() {
            return Err(PropertyError::UnknownColumns(unknown));
        }

        // keep the anchor and every source that contributes a column
        let mut remap = vec![None; plans.len()];
        let mut kept = Vec::new();
        for (index, plan) in plans.into_iter().enumerate() {
            if index == 0 || plan.contributes() {
                remap[index] = Some(kept.len());
                kept.push(plan);
            }
        }

        let links: BTreeSet<String> = kept
            .iter()
            .skip(1)
            .map(|plan| plan.source.link.to_lowercase())
            .collect();
        for link in links {
            push_unique(&mut kept[0].columns, &link);
        }

        let columns = attribution
            .into_iter()
            .filter_map(|(name, index)| {
                remap[index].map(|source| PlannedColumn { name, source })
            })
            .collect();

        Ok(PropertyPlan {
            columns,
            sources: kept,
            chunk_size: self.layout.chunk_size,
        })
    }

    fn table_has(&self, table: &str, column: &str) -> Result<bool, PropertyError> {
        self.catalog
            .columns_of(table)
            .map(|columns| columns.contains(column))
            .ok_or_else(|| PropertyError::CatalogMissing {
                table: table.to_string(),
            })
    }
}

fn push_unique(columns: &mut Vec<String>, column: &str) {
    if !columns.iter().any(|c| c == column) {
        columns.push(column.to_string());
    }
}

impl PropertyPlan {
    pub fn anchor(&self) -> &SourcePlan {
        &self.sources[0]
    }

    /// Upper-cased output header: the anchor key then the requested columns.
    pub fn output_columns(&self) -> Vec<String> {
        std::iter::once(self.anchor().source.key.to_uppercase())
            .chain(self.columns.iter().map(|c| c.name.to_uppercase()))
            .collect()
    }
}

impl SourcePlan {
    fn empty(source: &PropertySource) -> Self {
        Self {
            source: source.clone(),
            columns: vec![source.key.to_lowercase()],
            bridge_columns: Vec::new(),
            computed: Vec::new(),
            key_requested: false,
        }
    }

    fn contributes(&self) -> bool {
        self.key_requested
            || self.columns.len() > 1
            || !self.bridge_columns.is_empty()
            || !self.computed.is_empty()
    }

    /// `SELECT t.key, .. FROM table t [INNER JOIN bridge b ON ..] WHERE t.key IN (..)`
    pub fn select_for(&self, keys: &[Value]) -> Select {
        let source = &self.source;
        let mut columns: Vec<Expr> = self
            .columns
            .iter()
            .map(|c| qualified(SOURCE_ALIAS, c))
            .collect();
        columns.extend(self.bridge_columns.iter().map(|c| qualified(BRIDGE_ALIAS, c)));
        columns.extend(self.computed.iter().map(|c| Expr::Alias {
            expr: Box::new(Expr::Raw(c.expression.clone())),
            alias: c.name.clone(),
        }));

        let mut builder = SelectBuilder::new()
            .select(columns)
            .from(table_ref!(source.schema.as_deref(), &source.table), Some(SOURCE_ALIAS));

        if let Some(bridge) = &source.bridge {
            builder = builder.join(
                JoinKind::Inner,
                table_ref!(bridge.schema.as_deref(), &bridge.table),
                Some(BRIDGE_ALIAS),
                Expr::binary(
                    qualified(SOURCE_ALIAS, &bridge.source_column),
                    BinaryOperator::Eq,
                    qualified(BRIDGE_ALIAS, &bridge.bridge_column),
                ),
            );
        }

        builder = builder.where_clause(Expr::InList {
            expr: Box::new(qualified(SOURCE_ALIAS, &source.key)),
            list: keys.iter().cloned().map(Expr::Value).collect(),
            negated: false,
        });

        if let Some(latest) = &source.latest {
            let table = match &source.schema {
                Some(schema) => format!("{schema}.{}", source.table),
                None => source.table.clone(),
            };
            builder = builder.and_where(Expr::InSubquery {
                expr: Box::new(qualified(SOURCE_ALIAS, latest)),
                subquery: format!("SELECT MAX({latest}) FROM {table}"),
                negated: false,
            });
        }

        builder.build()
    }

    /// Names under which the requested columns come back from `select_for`.
    pub fn provided(&self) -> impl Iterator<Item = &str> {
        let skip = if self.key_requested { 0 } else { 1 };
        self.columns
            .iter()
            .skip(skip)
            .chain(self.bridge_columns.iter())
            .map(String::as_str)
            .chain(self.computed.iter().map(|c| c.name.as_str()))
    }
}
