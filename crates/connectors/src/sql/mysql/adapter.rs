use crate::sql::{
    base::{
        adapter::{DatabaseKind, SqlAdapter},
        error::{ConnectorError, DbError},
        row::DbRow,
    },
    mysql::params::positional,
};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use mysql_async::{Opts, Pool, Row, prelude::Queryable};
use planner::query::dialect::{self, Dialect};
use tracing::{debug, info};

const TABLE_COLUMNS_SQL: &str = include_str!("sql/table_columns.sql");

/// MySQL access through a `mysql_async` connection pool.
#[derive(Clone)]
pub struct MySqlAdapter {
    pool: Pool,
    dialect: dialect::MySql,
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;
        let pool = Pool::new(opts);
        // fail fast on unreachable servers
        drop(pool.get_conn().await?);
        Ok(MySqlAdapter {
            pool,
            dialect: dialect::MySql,
        })
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        debug!(params = params.len(), "MySQL query: {}", sql);
        let mut conn = self.pool.get_conn().await?;
        let rows: Vec<Row> = conn.exec(sql, positional(&params)).await?;
        Ok(rows
            .iter()
            .map(|row| DbRow::MySqlRow(row).to_row_data(""))
            .collect())
    }

    async fn table_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DbError> {
        let bindings = [
            schema.map_or(Value::Null, |s| Value::String(s.to_string())),
            Value::String(table.to_string()),
        ];
        let mut conn = self.pool.get_conn().await?;
        let columns: Vec<String> = conn
            .exec(TABLE_COLUMNS_SQL, positional(&bindings))
            .await?;
        Ok(columns)
    }

    async fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        match conn.query_first::<i32, _>("SELECT 1").await? {
            Some(1) => {
                info!("MySQL connection is alive");
                Ok(())
            }
            other => Err(DbError::Unexpected(format!("SELECT 1 returned {other:?}"))),
        }
    }

    fn dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }
}
