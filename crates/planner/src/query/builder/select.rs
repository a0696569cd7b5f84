//! Typestate builder for [`Select`].
//!
//! `SelectBuilder::new().select(..).from(..)` must come first; joins and
//! conditions are only available once the `FROM` table is known.

use crate::query::ast::{
    common::{JoinKind, TableRef},
    expr::{BinaryOperator, Expr},
    select::{FromClause, JoinClause, Select},
};

/// Nothing set yet.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// Projection set, waiting for the `FROM` table.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// `FROM` set; joins and conditions may follow.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    _state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            _state: InitialState,
        }
    }

    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            _state: SelectState,
        }
    }
}

impl SelectBuilder<SelectState> {
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(String::from),
        });
        SelectBuilder {
            ast: self.ast,
            _state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Appends a join; joins render in the order they were added.
    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.ast.joins.push(JoinClause {
            kind,
            table,
            alias: alias.map(String::from),
            on,
        });
        self
    }

    /// Sets the condition, replacing any previous one.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// ANDs `condition` onto the current condition.
    pub fn and_where(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => Expr::binary(existing, BinaryOperator::And, condition),
            None => condition,
        });
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query::qualified, table_ref};
    use model::core::value::Value;

    fn status_is(code: &str) -> Expr {
        Expr::binary(
            qualified("ca", "clearing_status"),
            BinaryOperator::Eq,
            Expr::Value(Value::String(code.into())),
        )
    }

    #[test]
    fn test_projection_and_from() {
        let ast = SelectBuilder::new()
            .select(vec![qualified("ca", "acct_id")])
            .from(table_ref!(Some("ibcust"), "customeraccount_rtab"), Some("ca"))
            .build();

        let from = ast.from.unwrap();
        assert_eq!(from.table.schema.as_deref(), Some("ibcust"));
        assert_eq!(from.alias.as_deref(), Some("ca"));
        assert!(ast.joins.is_empty());
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_joins_keep_insertion_order() {
        let ast = SelectBuilder::new()
            .select(vec![qualified("ca", "acct_id")])
            .from(table_ref!("customeraccount_rtab"), Some("ca"))
            .join(
                JoinKind::Inner,
                table_ref!("applicant_rtab"),
                Some("ap"),
                Expr::binary(
                    qualified("ca", "applicant_id"),
                    BinaryOperator::Eq,
                    qualified("ap", "id"),
                ),
            )
            .join(
                JoinKind::Left,
                table_ref!("rep_dim_acct"),
                Some("rda"),
                Expr::binary(
                    qualified("ca", "acct_id"),
                    BinaryOperator::Eq,
                    qualified("rda", "acct_id"),
                ),
            )
            .build();

        let kinds: Vec<_> = ast.joins.iter().map(|j| j.kind).collect();
        assert_eq!(kinds, vec![JoinKind::Inner, JoinKind::Left]);
    }

    #[test]
    fn test_and_where_on_empty_condition() {
        let ast = SelectBuilder::new()
            .select(vec![qualified("ca", "acct_id")])
            .from(table_ref!("customeraccount_rtab"), Some("ca"))
            .and_where(status_is("O"))
            .build();
        assert_eq!(ast.where_clause, Some(status_is("O")));
    }

    #[test]
    fn test_and_where_extends_condition() {
        let ast = SelectBuilder::new()
            .select(vec![qualified("ca", "acct_id")])
            .from(table_ref!("customeraccount_rtab"), Some("ca"))
            .where_clause(status_is("O"))
            .and_where(status_is("P"))
            .build();
        assert_eq!(
            ast.where_clause,
            Some(Expr::binary(status_is("O"), BinaryOperator::And, status_is("P")))
        );
    }
}
