use crate::{
    error::AdapterError,
    sql::{
        base::adapter::{DatabaseKind, SqlAdapter},
        mysql::adapter::MySqlAdapter,
        postgres::adapter::PgAdapter,
    },
};
use tracing::info;

#[derive(Clone)]
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
}

impl Adapter {
    pub async fn sql(kind: DatabaseKind, conn_str: &str) -> Result<Self, AdapterError> {
        info!("Connecting to {} database", kind);
        let connected = match kind {
            DatabaseKind::MySql => MySqlAdapter::connect(conn_str).await.map(Adapter::MySql),
            DatabaseKind::Postgres => PgAdapter::connect(conn_str).await.map(Adapter::Postgres),
        };
        connected.map_err(|source| AdapterError::Connect { kind, source })
    }

    pub fn get_sql(&self) -> &dyn SqlAdapter {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
        }
    }
}
