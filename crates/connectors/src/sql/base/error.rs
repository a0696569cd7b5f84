use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A value could not be converted to or from the driver representation.
    #[error("Decode error on column `{column}`: {reason}")]
    Decode { column: String, reason: String },

    /// A value does not fit the type the server expects for a parameter.
    #[error("Cannot bind parameter ${position} as {ty}: {reason}")]
    Bind {
        position: usize,
        ty: String,
        reason: String,
    },

    #[error("Unexpected result: {0}")]
    Unexpected(String),
}

/// Errors happening during adapter or connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    #[error("MySQL connector creation failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Postgres connector creation failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),
}
