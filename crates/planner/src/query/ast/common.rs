//! Table references and join kinds shared by the statement nodes.

use serde::{Deserialize, Serialize};

/// A table, optionally schema-qualified (`ibcust.applicant_rtab`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    /// Keeps rows of the left side that have no match.
    Left,
}
