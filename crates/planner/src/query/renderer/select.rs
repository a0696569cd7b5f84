use crate::query::{
    ast::{
        common::JoinKind,
        select::{FromClause, JoinClause, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        if let Some(condition) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            condition.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        r.render_table_ref(&self.table);
        r.render_alias(self.alias.as_deref());
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(match self.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
        });
        r.render_table_ref(&self.table);
        r.render_alias(self.alias.as_deref());
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::{
        query::{
            ast::{
                common::JoinKind,
                expr::{BinaryOperator, Expr, FunctionCall},
                select::{FromClause, JoinClause, Select},
            },
            dialect::{MySql, Postgres},
            ident, qualified,
            renderer::{render_inline, render_parameterized},
        },
        table_ref,
    };

    fn accounts(schema: Option<&str>, alias: Option<&str>) -> Option<FromClause> {
        Some(FromClause {
            table: table_ref!(schema, "customeraccount_rtab"),
            alias: alias.map(str::to_string),
        })
    }

    #[test]
    fn test_select_without_condition() {
        let ast = Select {
            columns: vec![ident("acct_id"), ident("title")],
            from: accounts(None, None),
            ..Default::default()
        };
        assert_eq!(
            render_inline(&ast, &Postgres),
            r#"SELECT "acct_id", "title" FROM "customeraccount_rtab""#
        );
    }

    #[test]
    fn test_parameterized_mysql() {
        let ast = Select {
            columns: vec![ident("acct_id")],
            from: accounts(Some("ibcust"), None),
            where_clause: Some(Expr::binary(
                ident("title"),
                BinaryOperator::Like,
                Expr::Value(Value::String("Acme%".to_string())),
            )),
            ..Default::default()
        };

        let (sql, params) = render_parameterized(&ast, &MySql);
        assert_eq!(
            sql,
            "SELECT `acct_id` FROM `ibcust`.`customeraccount_rtab` WHERE (`title` LIKE ?)"
        );
        assert_eq!(params, vec![Value::String("Acme%".to_string())]);
    }

    #[test]
    fn test_left_join_with_aliased_function() {
        let ast = Select {
            columns: vec![
                qualified("ca", "acct_id"),
                Expr::Alias {
                    expr: Box::new(Expr::FunctionCall(FunctionCall {
                        name: "COUNT".to_string(),
                        args: vec![qualified("rda", "acct_id")],
                        wildcard: false,
                    })),
                    alias: "dim_count".to_string(),
                },
            ],
            from: accounts(None, Some("ca")),
            joins: vec![JoinClause {
                kind: JoinKind::Left,
                table: table_ref!("rep_dim_acct"),
                alias: Some("rda".to_string()),
                on: Expr::binary(
                    qualified("ca", "acct_id"),
                    BinaryOperator::Eq,
                    qualified("rda", "acct_id"),
                ),
            }],
            where_clause: Some(Expr::binary(
                qualified("ca", "clearing_status"),
                BinaryOperator::NotEq,
                Expr::Value(Value::String("C".to_string())),
            )),
        };

        let (sql, params) = render_parameterized(&ast, &Postgres);
        assert_eq!(
            sql,
            concat!(
                r#"SELECT "ca"."acct_id", COUNT("rda"."acct_id") AS "dim_count" "#,
                r#"FROM "customeraccount_rtab" AS "ca" "#,
                r#"LEFT JOIN "rep_dim_acct" AS "rda" ON ("ca"."acct_id" = "rda"."acct_id") "#,
                r#"WHERE ("ca"."clearing_status" <> $1)"#
            )
        );
        assert_eq!(params, vec![Value::String("C".to_string())]);
    }

    #[test]
    fn test_inline_escapes_literals() {
        let ast = Select {
            columns: vec![ident("acct_id")],
            from: accounts(None, None),
            where_clause: Some(Expr::binary(
                ident("title"),
                BinaryOperator::Eq,
                Expr::Value(Value::String("O'Neil".to_string())),
            )),
            ..Default::default()
        };

        let (sql, params) = render_parameterized(&ast, &Postgres);
        assert_eq!(params.len(), 1);
        assert_eq!(
            render_inline(&ast, &Postgres),
            r#"SELECT "acct_id" FROM "customeraccount_rtab" WHERE ("title" = 'O''Neil')"#
        );
        assert!(!sql.contains("O''Neil"));
    }
}
