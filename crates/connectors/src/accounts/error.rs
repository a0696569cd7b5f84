use crate::sql::base::error::DbError;
use planner::{filter::FilterError, properties::PropertyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountsError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Property(#[from] PropertyError),

    /// Passed through from the database untouched.
    #[error("Execution failed: {0}")]
    Execution(#[from] DbError),

    #[error("Result set has no `{column}` column")]
    MissingKeyColumn { column: String },
}
