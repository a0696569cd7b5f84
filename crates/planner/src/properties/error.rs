use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("Unknown column(s): {}", .0.join(", "))]
    UnknownColumns(Vec<String>),

    #[error("Schema catalog has no entry for property table `{table}`")]
    CatalogMissing { table: String },

    #[error("Invalid property layout: {0}")]
    InvalidLayout(String),
}
