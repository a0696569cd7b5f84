use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::FunctionCall(func) => func.render(r),
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.sql.push_str(" AS ");
                r.sql.push_str(&r.dialect.quote_identifier(alias));
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push_str("))");
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                r.sql.push_str(subquery.trim());
                r.sql.push_str("))");
            }
            Expr::Between { expr, low, high } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(" BETWEEN ");
                low.render(r);
                r.sql.push_str(" AND ");
                high.render(r);
                r.sql.push(')');
            }
            Expr::IsNull { expr, negated } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Expr::Raw(sql) => r.sql.push_str(sql),
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::Like => " LIKE ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        if self.wildcard {
            r.sql.push('*');
        } else {
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                arg.render(r);
            }
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::query::{
        ast::expr::{Expr, FunctionCall},
        dialect::{MySql, Postgres},
        qualified,
        renderer::{render_inline, render_parameterized},
        value,
    };

    fn strings(items: &[&str]) -> Vec<Expr> {
        items
            .iter()
            .map(|s| value(Value::String(s.to_string())))
            .collect()
    }

    #[test]
    fn test_in_list_inline_and_parameterized() {
        let expr = Expr::InList {
            expr: Box::new(qualified("ca", "phylum_code")),
            list: strings(&["C", "D"]),
            negated: false,
        };

        assert_eq!(
            render_inline(&expr, &Postgres),
            r#"("ca"."phylum_code" IN ('C', 'D'))"#
        );

        let (sql, params) = render_parameterized(&expr, &Postgres);
        assert_eq!(sql, r#"("ca"."phylum_code" IN ($1, $2))"#);
        assert_eq!(params, vec![Value::String("C".into()), Value::String("D".into())]);
    }

    #[test]
    fn test_not_in_subquery_is_verbatim() {
        let expr = Expr::InSubquery {
            expr: Box::new(qualified("rda", "acct_id")),
            subquery: " select acct_id from t where rownum < 6 ".to_string(),
            negated: true,
        };

        let (sql, params) = render_parameterized(&expr, &MySql);
        assert_eq!(
            sql,
            "(`rda`.`acct_id` NOT IN (select acct_id from t where rownum < 6))"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_between_and_is_null() {
        let between = Expr::Between {
            expr: Box::new(qualified("rda", "day_begun")),
            low: Box::new(value(Value::Int(20160801))),
            high: Box::new(value(Value::Int(20160820))),
        };
        assert_eq!(
            render_inline(&between, &Postgres),
            r#"("rda"."day_begun" BETWEEN 20160801 AND 20160820)"#
        );

        let is_not_null = Expr::IsNull {
            expr: Box::new(qualified("ca", "closed_date")),
            negated: true,
        };
        assert_eq!(
            render_inline(&is_not_null, &MySql),
            "(`ca`.`closed_date` IS NOT NULL)"
        );
    }

    #[test]
    fn test_function_call_name_is_not_quoted() {
        let call = Expr::FunctionCall(FunctionCall {
            name: "pa_rep_cust_fns.fn_getaccappcntry".to_string(),
            args: vec![qualified("ca", "acct_id")],
            wildcard: false,
        });
        assert_eq!(
            render_inline(&call, &Postgres),
            r#"pa_rep_cust_fns.fn_getaccappcntry("ca"."acct_id")"#
        );
    }
}
