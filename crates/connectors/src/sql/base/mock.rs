//! In-memory adapter that records every statement it receives.

use crate::sql::base::{
    adapter::{DatabaseKind, SqlAdapter},
    error::{ConnectorError, DbError},
};
use async_trait::async_trait;
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use planner::query::dialect::{self, Dialect};
use std::{collections::HashMap, sync::Mutex};

type Responder = Box<dyn Fn(&str, &[Value]) -> Result<Vec<RowData>, DbError> + Send + Sync>;

pub struct RecordingAdapter {
    responder: Responder,
    columns: HashMap<String, Vec<String>>,
    queries: Mutex<Vec<(String, Vec<Value>)>>,
    introspected: Mutex<Vec<(Option<String>, String)>>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::responding(|_, _| Ok(Vec::new()))
    }

    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Vec<RowData>, DbError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            columns: HashMap::new(),
            queries: Mutex::new(Vec::new()),
            introspected: Mutex::new(Vec::new()),
        }
    }

    pub fn with_columns(mut self, table: &str, columns: &[&str]) -> Self {
        self.columns.insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    pub fn queries(&self) -> Vec<(String, Vec<Value>)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    pub fn introspected(&self) -> Vec<(Option<String>, String)> {
        self.introspected.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

/// Builds a row from `(column, value)` pairs.
pub fn row(fields: &[(&str, Value)]) -> RowData {
    RowData::new(
        "",
        fields
            .iter()
            .map(|(name, value)| FieldValue {
                name: name.to_string(),
                value: Some(value.clone()),
            })
            .collect(),
    )
}

#[async_trait]
impl SqlAdapter for RecordingAdapter {
    async fn connect(_url: &str) -> Result<Self, ConnectorError> {
        Ok(Self::new())
    }

    async fn query_rows(&self, sql: &str, params: Vec<Value>) -> Result<Vec<RowData>, DbError> {
        let rows = (self.responder)(sql, &params);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((sql.to_string(), params));
        }
        rows
    }

    async fn table_columns(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> Result<Vec<String>, DbError> {
        if let Ok(mut introspected) = self.introspected.lock() {
            introspected.push((schema.map(str::to_string), table.to_string()));
        }
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    fn dialect(&self) -> &dyn Dialect {
        &dialect::Postgres
    }

    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }
}
