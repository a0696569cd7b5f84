use crate::{accounts::error::AccountsError, sql::base::adapter::SqlAdapter};
use model::core::value::Value;
use planner::filter::{CompiledQuery, FilterCompiler, FilterNode};
use std::time::Instant;
use tracing::{debug, info};

/// Runs account filters against one database.
pub struct AccountFinder<'a> {
    compiler: FilterCompiler<'a>,
    adapter: &'a dyn SqlAdapter,
}

impl<'a> AccountFinder<'a> {
    pub fn new(compiler: FilterCompiler<'a>, adapter: &'a dyn SqlAdapter) -> Self {
        Self { compiler, adapter }
    }

    /// Statement text in the adapter's dialect. Nothing is executed.
    pub fn compile(&self, filter: &FilterNode) -> Result<String, AccountsError> {
        let compiled = self.compiler.compile(filter)?;
        Ok(compiled.sql(self.adapter.dialect()))
    }

    /// Executes the filter and returns the matching account ids in row order.
    pub async fn find(&self, filter: &FilterNode) -> Result<Vec<Value>, AccountsError> {
        let compiled = self.compiler.compile(filter)?;
        self.execute(&compiled).await
    }

    pub async fn execute(&self, compiled: &CompiledQuery) -> Result<Vec<Value>, AccountsError> {
        let start = Instant::now();
        let (sql, params) = compiled.parameterized(self.adapter.dialect());
        debug!("Account query parameters: {:?}", params);

        let rows = self.adapter.query_rows(&sql, params).await?;
        let key = &self.compiler.schema().anchor_key;
        let ids = rows
            .into_iter()
            .map(|row| {
                row.get(key)
                    .map(|field| field.value.clone().unwrap_or(Value::Null))
                    .ok_or_else(|| AccountsError::MissingKeyColumn {
                        column: key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Found {} accounts in {:?}", ids.len(), start.elapsed());
        Ok(ids)
    }
}
