use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
        row::DbRow,
    },
    postgres::{connect, params::PgParamStore},
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use planner::query::dialect::{self, Dialect};
use std::sync::Arc;
use tokio_postgres::Client;
use tracing::{debug, info};

const TABLE_COLUMNS_SQL: &str = include_str!("sql/table_columns.sql");

/// Postgres access over a single shared client. `tokio_postgres::Client`
/// pipelines concurrent queries itself, so no lock is needed.
#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<Client>,
    dialect: dialect::Postgres,
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        Ok(PgAdapter {
            client: Arc::new(connect::open(url).await?),
            dialect: dialect::Postgres,
        })
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        debug!(params = params.len(), "Postgres query: {}", sql);
        // prepared first so the server infers each parameter's column type
        let statement = self.client.prepare(sql).await?;
        let bindings = PgParamStore::bind(params, statement.params())?;
        let rows = self.client.query(&statement, &bindings.as_refs()).await?;
        Ok(rows
            .iter()
            .map(|row| DbRow::PostgresRow(row).to_row_data(""))
            .collect())
    }

    async fn table_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DbError> {
        let rows = self
            .client
            .query(TABLE_COLUMNS_SQL, &[&schema, &table])
            .await?;
        rows.iter()
            .map(|row| row.try_get::<_, String>("column_name").map_err(DbError::from))
            .collect()
    }

    async fn ping(&self) -> Result<(), DbError> {
        let one: i32 = self.client.query_one("SELECT 1", &[]).await?.try_get(0)?;
        if one != 1 {
            return Err(DbError::Unexpected(format!("SELECT 1 returned {one}")));
        }
        info!("Postgres connection is alive");
        Ok(())
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }
}
