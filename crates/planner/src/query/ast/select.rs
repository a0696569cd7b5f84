//! The SELECT statement: a projection over one table, zero or more joins
//! and an optional condition.

use crate::query::ast::{
    common::{JoinKind, TableRef},
    expr::Expr,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// Projected expressions, e.g. `ca.acct_id`.
    pub columns: Vec<Expr>,

    pub from: Option<FromClause>,

    /// Rendered in order, after `from`.
    pub joins: Vec<JoinClause>,

    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub table: TableRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: Option<String>,
    /// e.g. `ca.applicant_id = ap.id`
    pub on: Expr,
}
