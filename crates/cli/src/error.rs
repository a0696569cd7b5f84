use connectors::{accounts::AccountsError, error::AdapterError, sql::base::error::DbError};
use planner::{filter::FilterError, properties::PropertyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid connection format provided: {0}")]
    InvalidConnectionFormat(String),

    #[error("No connection string given: pass --conn-str or set {0}")]
    MissingConnection(&'static str),

    #[error("No schema catalog available: pass --catalog, configure one, or give a connection")]
    MissingCatalog,

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Invalid property request: {0}")]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Accounts(#[from] AccountsError),

    #[error("Failed to connect: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Shutdown requested")]
    ShutdownRequested,
}
