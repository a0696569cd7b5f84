use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;
use model::{core::value::Value, records::row::RowData};
use planner::query::dialect::{Dialect, DialectKind};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
}

impl DatabaseKind {
    pub fn dialect_kind(&self) -> DialectKind {
        match self {
            DatabaseKind::MySql => DialectKind::MySql,
            DatabaseKind::Postgres => DialectKind::Postgres,
        }
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseKind::MySql),
            "pg" | "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            other => Err(format!("Unknown database kind: {other}")),
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::MySql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgres"),
        }
    }
}

/// Statement execution and introspection against one database.
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    /// Runs a query with positional parameters and returns its rows in order.
    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError>;

    /// Column names of `table`, in ordinal order. Empty when the table does
    /// not exist. `schema` defaults to the connection's current schema.
    async fn table_columns(&self, schema: Option<&str>, table: &str)
    -> Result<Vec<String>, DbError>;

    async fn ping(&self) -> Result<(), DbError>;

    fn dialect(&self) -> &dyn Dialect;
    fn kind(&self) -> DatabaseKind;
}
