//! The closed set of predicate operators and the SQL each one produces.

use crate::{
    filter::{error::FilterError, tree::Operand},
    query::ast::expr::{BinaryOperator, Expr, FunctionCall},
};
use model::core::value::Value;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Equals,
    NotEqual,
    Like,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
    /// Compares the country derived from the column by the schema's country
    /// function.
    AcctCountry,
}

impl OperatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::Equals => "equals",
            OperatorKind::NotEqual => "not_equal",
            OperatorKind::Like => "like",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::In => "in",
            OperatorKind::NotIn => "not_in",
            OperatorKind::Between => "between",
            OperatorKind::IsNull => "is_null",
            OperatorKind::IsNotNull => "is_not_null",
            OperatorKind::AcctCountry => "acct_country",
        }
    }

    /// Builds the predicate for `column` against `operand`.
    ///
    /// `field` is only used to label errors.
    pub fn build(
        &self,
        field: &str,
        column: Expr,
        operand: &Operand,
        country_function: &str,
    ) -> Result<Expr, FilterError> {
        let malformed = |reason: &str| FilterError::MalformedOperand {
            field: field.to_string(),
            operator: self.name().to_string(),
            reason: reason.to_string(),
        };

        match self {
            OperatorKind::Equals => equality(column, operand, false).ok_or_else(|| {
                malformed("expected a scalar, null or a list of scalars")
            }),
            OperatorKind::NotEqual => equality(column, operand, true).ok_or_else(|| {
                malformed("expected a scalar, null or a list of scalars")
            }),
            OperatorKind::AcctCountry => {
                let call = Expr::FunctionCall(FunctionCall {
                    name: country_function.to_string(),
                    args: vec![column],
                    wildcard: false,
                });
                equality(call, operand, false)
                    .ok_or_else(|| malformed("expected a country code or a list of codes"))
            }
            OperatorKind::Like => match operand {
                Operand::Value(v @ Value::String(_)) => Ok(Expr::binary(
                    column,
                    BinaryOperator::Like,
                    Expr::Value(v.clone()),
                )),
                _ => Err(malformed("expected a string pattern")),
            },
            OperatorKind::Gt | OperatorKind::Gte | OperatorKind::Lt | OperatorKind::Lte => {
                let op = match self {
                    OperatorKind::Gt => BinaryOperator::Gt,
                    OperatorKind::Gte => BinaryOperator::GtEq,
                    OperatorKind::Lt => BinaryOperator::Lt,
                    _ => BinaryOperator::LtEq,
                };
                match operand {
                    Operand::Value(v) if !v.is_null() => {
                        Ok(Expr::binary(column, op, Expr::Value(v.clone())))
                    }
                    _ => Err(malformed("expected a non-null scalar")),
                }
            }
            OperatorKind::In | OperatorKind::NotIn => {
                let negated = *self == OperatorKind::NotIn;
                match operand {
                    Operand::List(values) if values.is_empty() => {
                        Err(malformed("the value list is empty"))
                    }
                    Operand::List(values) => Ok(in_list(column, values, negated)),
                    Operand::Subquery(sql) => Ok(Expr::InSubquery {
                        expr: Box::new(column),
                        subquery: sql.clone(),
                        negated,
                    }),
                    _ => Err(malformed("expected a list of values or a subquery")),
                }
            }
            OperatorKind::Between => {
                let (low, high) = match operand {
                    Operand::Range(low, high) => (low, high),
                    Operand::List(values) if values.len() == 2 => (&values[0], &values[1]),
                    _ => return Err(malformed("expected exactly two bounds [low, high]")),
                };
                if low.is_null() || high.is_null() {
                    return Err(malformed("bounds must not be null"));
                }
                Ok(Expr::Between {
                    expr: Box::new(column),
                    low: Box::new(Expr::Value(low.clone())),
                    high: Box::new(Expr::Value(high.clone())),
                })
            }
            OperatorKind::IsNull | OperatorKind::IsNotNull => match operand {
                Operand::None | Operand::Value(Value::Null) | Operand::Value(Value::Boolean(true)) => {
                    Ok(Expr::IsNull {
                        expr: Box::new(column),
                        negated: *self == OperatorKind::IsNotNull,
                    })
                }
                _ => Err(malformed("takes no operand (use null or true)")),
            },
        }
    }
}

/// `=` / `<>` against a scalar, `IS [NOT] NULL` against null and
/// `[NOT] IN` against a list.
fn equality(column: Expr, operand: &Operand, negated: bool) -> Option<Expr> {
    match operand {
        Operand::Value(Value::Null) => Some(Expr::IsNull {
            expr: Box::new(column),
            negated,
        }),
        Operand::Value(v) => {
            let op = if negated {
                BinaryOperator::NotEq
            } else {
                BinaryOperator::Eq
            };
            Some(Expr::binary(column, op, Expr::Value(v.clone())))
        }
        Operand::List(values) if !values.is_empty() => Some(in_list(column, values, negated)),
        _ => None,
    }
}

fn in_list(column: Expr, values: &[Value], negated: bool) -> Expr {
    Expr::InList {
        expr: Box::new(column),
        list: values.iter().cloned().map(Expr::Value).collect(),
        negated,
    }
}

impl FromStr for OperatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equals" => Ok(OperatorKind::Equals),
            "not_equal" => Ok(OperatorKind::NotEqual),
            "like" => Ok(OperatorKind::Like),
            "gt" => Ok(OperatorKind::Gt),
            "gte" => Ok(OperatorKind::Gte),
            "lt" => Ok(OperatorKind::Lt),
            "lte" => Ok(OperatorKind::Lte),
            "in" => Ok(OperatorKind::In),
            "not_in" => Ok(OperatorKind::NotIn),
            "between" => Ok(OperatorKind::Between),
            "is_null" => Ok(OperatorKind::IsNull),
            "is_not_null" => Ok(OperatorKind::IsNotNull),
            "acct_country" => Ok(OperatorKind::AcctCountry),
            other => Err(format!("Unknown operator: {other}")),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{dialect::Postgres, qualified, renderer::render_inline};

    const COUNTRY_FN: &str = "pa_rep_cust_fns.fn_getaccappcntry";

    fn compile(operator: OperatorKind, operand: Operand) -> Result<String, FilterError> {
        operator
            .build("status", qualified("ca", "status"), &operand, COUNTRY_FN)
            .map(|expr| render_inline(&expr, &Postgres))
    }

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    #[test]
    fn test_every_name_parses_back() {
        let all = [
            OperatorKind::Equals,
            OperatorKind::NotEqual,
            OperatorKind::Like,
            OperatorKind::Gt,
            OperatorKind::Gte,
            OperatorKind::Lt,
            OperatorKind::Lte,
            OperatorKind::In,
            OperatorKind::NotIn,
            OperatorKind::Between,
            OperatorKind::IsNull,
            OperatorKind::IsNotNull,
            OperatorKind::AcctCountry,
        ];
        for op in all {
            assert_eq!(op.name().parse::<OperatorKind>(), Ok(op));
        }
        assert!("contains".parse::<OperatorKind>().is_err());
    }

    #[test]
    fn test_equality_variants() {
        assert_eq!(
            compile(OperatorKind::Equals, Operand::Value(s("O"))).unwrap(),
            r#"("ca"."status" = 'O')"#
        );
        assert_eq!(
            compile(OperatorKind::Equals, Operand::Value(Value::Null)).unwrap(),
            r#"("ca"."status" IS NULL)"#
        );
        assert_eq!(
            compile(OperatorKind::NotEqual, Operand::Value(Value::Null)).unwrap(),
            r#"("ca"."status" IS NOT NULL)"#
        );
        assert_eq!(
            compile(OperatorKind::NotEqual, Operand::List(vec![s("A"), s("B")])).unwrap(),
            r#"("ca"."status" NOT IN ('A', 'B'))"#
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            compile(OperatorKind::Gte, Operand::Value(Value::Int(5))).unwrap(),
            r#"("ca"."status" >= 5)"#
        );
        assert_eq!(
            compile(OperatorKind::Lt, Operand::Value(Value::Float(0.5))).unwrap(),
            r#"("ca"."status" < 0.5)"#
        );
        assert!(matches!(
            compile(OperatorKind::Gt, Operand::Value(Value::Null)),
            Err(FilterError::MalformedOperand { .. })
        ));
    }

    #[test]
    fn test_like_requires_string() {
        assert_eq!(
            compile(OperatorKind::Like, Operand::Value(s("U1%"))).unwrap(),
            r#"("ca"."status" LIKE 'U1%')"#
        );
        assert!(compile(OperatorKind::Like, Operand::Value(Value::Int(1))).is_err());
    }

    #[test]
    fn test_between_is_inclusive_range() {
        let sql = compile(
            OperatorKind::Between,
            Operand::Range(Value::Int(20160801), Value::Int(20160820)),
        )
        .unwrap();
        assert_eq!(sql, r#"("ca"."status" BETWEEN 20160801 AND 20160820)"#);

        // a two-element list is accepted as a range
        let from_list = compile(
            OperatorKind::Between,
            Operand::List(vec![Value::Int(20160801), Value::Int(20160820)]),
        )
        .unwrap();
        assert_eq!(sql, from_list);
    }

    #[test]
    fn test_between_rejects_wrong_arity() {
        let err = compile(OperatorKind::Between, Operand::List(vec![Value::Int(1)])).unwrap_err();
        assert_eq!(
            err,
            FilterError::MalformedOperand {
                field: "status".into(),
                operator: "between".into(),
                reason: "expected exactly two bounds [low, high]".into(),
            }
        );
        assert!(compile(OperatorKind::Between, Operand::Value(Value::Int(1))).is_err());
    }

    #[test]
    fn test_in_requires_sequence() {
        assert!(compile(OperatorKind::In, Operand::Value(s("C"))).is_err());
        assert!(compile(OperatorKind::In, Operand::List(vec![])).is_err());
        assert_eq!(
            compile(
                OperatorKind::In,
                Operand::Subquery("select acct_id from x".into())
            )
            .unwrap(),
            r#"("ca"."status" IN (select acct_id from x))"#
        );
    }

    #[test]
    fn test_null_checks_take_no_operand() {
        assert_eq!(
            compile(OperatorKind::IsNull, Operand::None).unwrap(),
            r#"("ca"."status" IS NULL)"#
        );
        assert_eq!(
            compile(OperatorKind::IsNotNull, Operand::Value(Value::Boolean(true))).unwrap(),
            r#"("ca"."status" IS NOT NULL)"#
        );
        assert!(compile(OperatorKind::IsNull, Operand::Value(s("x"))).is_err());
    }

    #[test]
    fn test_acct_country_wraps_column() {
        assert_eq!(
            compile(OperatorKind::AcctCountry, Operand::Value(s("HK"))).unwrap(),
            r#"(pa_rep_cust_fns.fn_getaccappcntry("ca"."status") = 'HK')"#
        );
    }
}
