use crate::sql::base::{adapter::DatabaseKind, error::ConnectorError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The server could not be reached or refused the connection.
    #[error("Could not connect to {kind} database: {source}")]
    Connect {
        kind: DatabaseKind,
        #[source]
        source: ConnectorError,
    },
}
