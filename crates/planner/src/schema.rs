//! The fixed three-table join graph the filter compiler targets.

use crate::{query::ast::common::TableRef, table_ref};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a table in the account join graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableRole {
    /// The table whose key is projected.
    Anchor,
    /// 1:1 table, inner-joined.
    Applicant,
    /// Dimension table, left-outer-joined.
    Dimension,
}

impl TableRole {
    pub const ALL: [TableRole; 3] = [TableRole::Anchor, TableRole::Applicant, TableRole::Dimension];
}

impl fmt::Display for TableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableRole::Anchor => write!(f, "anchor"),
            TableRole::Applicant => write!(f, "applicant"),
            TableRole::Dimension => write!(f, "dimension"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub alias: String,
}

impl TableSpec {
    pub fn new(name: &str, schema: Option<&str>, alias: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: schema.map(str::to_string),
            alias: alias.to_string(),
        }
    }

    pub fn table_ref(&self) -> TableRef {
        table_ref!(self.schema.as_deref(), &self.name)
    }

    /// True when `name` is this table's name or alias (case-insensitive).
    pub fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.alias.eq_ignore_ascii_case(name)
    }
}

/// Equality join from an anchor column to a column of the joined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinKeys {
    pub anchor_column: String,
    pub joined_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSchema {
    pub anchor: TableSpec,
    pub anchor_key: String,
    pub applicant: TableSpec,
    pub applicant_join: JoinKeys,
    pub dimension: TableSpec,
    pub dimension_join: JoinKeys,
    /// Function applied to a column by the `acct_country` operator.
    pub country_function: String,
}

impl Default for AccountSchema {
    fn default() -> Self {
        Self {
            anchor: TableSpec::new("customeraccount_rtab", Some("ibcust"), "ca"),
            anchor_key: "acct_id".to_string(),
            applicant: TableSpec::new("applicant_rtab", Some("ibcust"), "ap"),
            applicant_join: JoinKeys {
                anchor_column: "applicant_id".to_string(),
                joined_column: "id".to_string(),
            },
            dimension: TableSpec::new("rep_dim_acct", None, "rda"),
            dimension_join: JoinKeys {
                anchor_column: "acct_id".to_string(),
                joined_column: "acct_id".to_string(),
            },
            country_function: "pa_rep_cust_fns.fn_getaccappcntry".to_string(),
        }
    }
}

impl AccountSchema {
    pub fn table(&self, role: TableRole) -> &TableSpec {
        match role {
            TableRole::Anchor => &self.anchor,
            TableRole::Applicant => &self.applicant,
            TableRole::Dimension => &self.dimension,
        }
    }

    /// Finds the role of a table given its name or alias.
    pub fn role_of(&self, name: &str) -> Option<TableRole> {
        TableRole::ALL
            .into_iter()
            .find(|role| self.table(*role).answers_to(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = (TableRole, &TableSpec)> {
        TableRole::ALL.into_iter().map(|role| (role, self.table(role)))
    }
}
