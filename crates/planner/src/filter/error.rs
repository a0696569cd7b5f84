use thiserror::Error;

/// Errors raised while parsing or compiling a filter tree. Any of them
/// aborts the whole compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Operator `{operator}` on field `{field}` does not exist")]
    UnknownOperator { field: String, operator: String },

    #[error("Column `{column}` not available in any of the supported tables")]
    UnknownColumn { column: String },

    #[error("Column `{column}` available in more than one table: {}", tables.join(", "))]
    AmbiguousColumn { column: String, tables: Vec<String> },

    #[error("Table `{table}` referenced by `{field}` is not one of the supported tables")]
    UnknownTable { field: String, table: String },

    #[error("Malformed operand for `{field}` {operator}: {reason}")]
    MalformedOperand {
        field: String,
        operator: String,
        reason: String,
    },

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Schema catalog has no entry for table `{table}`")]
    CatalogMissing { table: String },
}
