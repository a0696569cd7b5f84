//! The filter tree and its JSON grammar.
//!
//! ```json
//! {
//!     "or":  { "clearing_status": "O", "applicant_rtab.type": "ORG" },
//!     "and": {
//!         "customeraccount_rtab.phylum_code": { "in": ["C", "D"] },
//!         "rep_dim_acct.day_begun": { "between": [20160801, 20160820] },
//!         "rep_dim_acct.acct_id": { "in": { "subquery": "select acct_id from ..." } }
//!     },
//!     "title": { "like": "Acme%" }
//! }
//! ```
//!
//! Top-level entries are ANDed. A group value is either an object of
//! field → predicate entries (which may nest further groups) or an array of
//! such objects.

use crate::filter::{error::FilterError, operator::OperatorKind};
use model::core::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::fmt;

const SUBQUERY_KEY: &str = "subquery";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group {
        kind: GroupKind,
        children: Vec<FilterNode>,
    },
    Predicate(Predicate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: FieldRef,
    pub operator: OperatorKind,
    pub operand: Operand,
}

/// A field reference, either `table.column` or a bare `column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Qualified { table: String, column: String },
    Bare(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Value(Value),
    List(Vec<Value>),
    Range(Value, Value),
    /// Pre-built sub-SELECT, accepted without validation.
    Subquery(String),
}

impl FilterNode {
    /// A tree with no predicates; compiles to the unconstrained projection.
    pub fn empty() -> Self {
        FilterNode::Group {
            kind: GroupKind::And,
            children: Vec::new(),
        }
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            kind: GroupKind::And,
            children,
        }
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Group {
            kind: GroupKind::Or,
            children,
        }
    }

    pub fn predicate(field: &str, operator: OperatorKind, operand: Operand) -> Self {
        FilterNode::Predicate(Predicate {
            field: FieldRef::parse(field),
            operator,
            operand,
        })
    }

    pub fn from_json(json: &JsonValue) -> Result<Self, FilterError> {
        match json {
            JsonValue::Object(entries) => Ok(FilterNode::and(parse_entries(entries)?)),
            other => Err(FilterError::MalformedFilter(format!(
                "expected an object at the top level, found {}",
                json_kind(other)
            ))),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self, FilterError> {
        let json: JsonValue = serde_json::from_str(source)
            .map_err(|e| FilterError::MalformedFilter(format!("invalid JSON: {e}")))?;
        Self::from_json(&json)
    }

    /// Number of predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        match self {
            FilterNode::Predicate(_) => 1,
            FilterNode::Group { children, .. } => {
                children.iter().map(FilterNode::predicate_count).sum()
            }
        }
    }
}

impl FieldRef {
    pub fn parse(field: &str) -> Self {
        match field.split_once('.') {
            Some((table, column)) => FieldRef::Qualified {
                table: table.trim().to_lowercase(),
                column: column.trim().to_lowercase(),
            },
            None => FieldRef::Bare(field.trim().to_lowercase()),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            FieldRef::Qualified { column, .. } => column,
            FieldRef::Bare(column) => column,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Qualified { table, column } => write!(f, "{table}.{column}"),
            FieldRef::Bare(column) => write!(f, "{column}"),
        }
    }
}

fn group_kind(key: &str) -> Option<GroupKind> {
    if key.eq_ignore_ascii_case("and") {
        Some(GroupKind::And)
    } else if key.eq_ignore_ascii_case("or") {
        Some(GroupKind::Or)
    } else {
        None
    }
}

fn parse_entries(entries: &Map<String, JsonValue>) -> Result<Vec<FilterNode>, FilterError> {
    entries
        .iter()
        .map(|(key, value)| match group_kind(key) {
            Some(kind) => parse_group(kind, key, value),
            None => parse_predicate(key, value),
        })
        .collect()
}

fn parse_group(kind: GroupKind, key: &str, value: &JsonValue) -> Result<FilterNode, FilterError> {
    let children = match value {
        JsonValue::Object(entries) => parse_entries(entries)?,
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::Object(entries) => {
                    let mut nodes = parse_entries(entries)?;
                    if nodes.len() == 1 {
                        Ok(nodes.remove(0))
                    } else {
                        Ok(FilterNode::and(nodes))
                    }
                }
                other => Err(FilterError::MalformedFilter(format!(
                    "`{key}` array items must be objects, found {}",
                    json_kind(other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(FilterError::MalformedFilter(format!(
                "`{key}` expects an object or an array of objects, found {}",
                json_kind(other)
            )));
        }
    };
    Ok(FilterNode::Group { kind, children })
}

fn parse_predicate(key: &str, spec: &JsonValue) -> Result<FilterNode, FilterError> {
    let field = FieldRef::parse(key);
    if field.column().is_empty()
        || matches!(&field, FieldRef::Qualified { table, .. } if table.is_empty())
    {
        return Err(FilterError::MalformedFilter(format!(
            "invalid field name `{key}`"
        )));
    }

    let (operator, operand) = match spec {
        JsonValue::Object(entries) if entries.len() == 1 => {
            let (name, operand) = entries.iter().next().ok_or_else(|| {
                FilterError::MalformedFilter(format!("empty predicate for `{key}`"))
            })?;
            let operator =
                name.parse::<OperatorKind>()
                    .map_err(|_| FilterError::UnknownOperator {
                        field: key.to_string(),
                        operator: name.clone(),
                    })?;
            (operator, operand)
        }
        JsonValue::Object(entries) => {
            return Err(FilterError::MalformedOperand {
                field: key.to_string(),
                operator: "equals".to_string(),
                reason: format!(
                    "a predicate object must hold exactly one operator, found {}",
                    entries.len()
                ),
            });
        }
        other => (OperatorKind::Equals, other),
    };

    let operand = parse_operand(operand).map_err(|reason| FilterError::MalformedOperand {
        field: key.to_string(),
        operator: operator.name().to_string(),
        reason,
    })?;

    Ok(FilterNode::Predicate(Predicate {
        field,
        operator,
        operand,
    }))
}

fn parse_operand(json: &JsonValue) -> Result<Operand, String> {
    match json {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                Value::from_json(item)
                    .ok_or_else(|| format!("list items must be scalars, found {}", json_kind(item)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Operand::List),
        JsonValue::Object(entries) => match entries.get(SUBQUERY_KEY) {
            Some(JsonValue::String(sql)) if entries.len() == 1 => Ok(Operand::Subquery(sql.clone())),
            _ => Err(format!(
                "object operands must be {{\"{SUBQUERY_KEY}\": \"<sql>\"}}"
            )),
        },
        scalar => Value::from_json(scalar)
            .map(Operand::Value)
            .ok_or_else(|| format!("unsupported operand {}", json_kind(scalar))),
    }
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected(json: JsonValue) -> FilterError {
        FilterNode::from_json(&json).expect_err("filter should be rejected")
    }

    fn pred(field: &str, operator: OperatorKind, operand: Operand) -> FilterNode {
        FilterNode::predicate(field, operator, operand)
    }

    #[test]
    fn test_bare_scalar_is_implicit_equals() {
        let tree = FilterNode::from_json(&json!({"clearing_status": "O"})).unwrap();
        assert_eq!(
            tree,
            FilterNode::and(vec![pred(
                "clearing_status",
                OperatorKind::Equals,
                Operand::Value(Value::String("O".into()))
            )])
        );
    }

    #[test]
    fn test_groups_and_key_order_are_preserved() {
        let tree = FilterNode::from_json(&json!({
            "or": {"clearing_status": "O", "applicant_rtab.type": "ORG"},
            "and": {"customeraccount_rtab.phylum_code": {"in": ["C", "D"]}},
            "title": {"like": "Acme%"}
        }))
        .unwrap();

        let FilterNode::Group { kind, children } = tree else {
            panic!("root must be a group");
        };
        assert_eq!(kind, GroupKind::And);
        assert_eq!(children.len(), 3);
        assert!(matches!(&children[0], FilterNode::Group { kind: GroupKind::Or, children } if children.len() == 2));
        assert!(matches!(&children[1], FilterNode::Group { kind: GroupKind::And, .. }));
        assert_eq!(
            children[2],
            pred(
                "title",
                OperatorKind::Like,
                Operand::Value(Value::String("Acme%".into()))
            )
        );
    }

    #[test]
    fn test_nested_and_array_groups() {
        let tree = FilterNode::from_json(&json!({
            "or": [
                {"clearing_status": "O"},
                {"and": {"type": "ORG", "phylum_code": "C"}},
                {"a": 1, "b": 2}
            ]
        }))
        .unwrap();

        let FilterNode::Group { children, .. } = tree else {
            panic!("root must be a group");
        };
        let FilterNode::Group { kind, children } = &children[0] else {
            panic!("expected or group");
        };
        assert_eq!(*kind, GroupKind::Or);
        assert!(matches!(&children[0], FilterNode::Predicate(_)));
        assert!(matches!(&children[1], FilterNode::Group { kind: GroupKind::And, children } if children.len() == 2));
        assert!(matches!(&children[2], FilterNode::Group { kind: GroupKind::And, children } if children.len() == 2));
    }

    #[test]
    fn test_operand_shapes() {
        let tree = FilterNode::from_json(&json!({
            "rep_dim_acct.acct_id": {"in": {"subquery": "select acct_id from t"}},
            "day_begun": {"between": [20160801, 20160820]},
            "closed_date": {"is_null": null}
        }))
        .unwrap();
        let FilterNode::Group { children, .. } = tree else {
            panic!("root must be a group");
        };
        assert_eq!(
            children[0],
            pred(
                "rep_dim_acct.acct_id",
                OperatorKind::In,
                Operand::Subquery("select acct_id from t".into())
            )
        );
        assert_eq!(
            children[1],
            pred(
                "day_begun",
                OperatorKind::Between,
                Operand::List(vec![Value::Int(20160801), Value::Int(20160820)])
            )
        );
        assert_eq!(
            children[2],
            pred("closed_date", OperatorKind::IsNull, Operand::Value(Value::Null))
        );
    }

    #[test]
    fn test_field_names_are_normalized() {
        assert_eq!(
            FieldRef::parse("Applicant_RTAB.Type"),
            FieldRef::Qualified {
                table: "applicant_rtab".into(),
                column: "type".into()
            }
        );
        assert_eq!(FieldRef::parse(" ACCT_ID "), FieldRef::Bare("acct_id".into()));
    }

    #[test]
    fn test_unknown_operator() {
        let err = rejected(json!({"title": {"contains": "x"}}));
        assert_eq!(
            err,
            FilterError::UnknownOperator {
                field: "title".into(),
                operator: "contains".into()
            }
        );
    }

    #[test]
    fn test_malformed_shapes() {
        assert!(matches!(
            rejected(json!(["not", "an", "object"])),
            FilterError::MalformedFilter(_)
        ));
        assert!(matches!(
            rejected(json!({"title": {"like": "a", "gt": 1}})),
            FilterError::MalformedOperand { .. }
        ));
        assert!(matches!(
            rejected(json!({"title": {"in": [["nested"]]}})),
            FilterError::MalformedOperand { .. }
        ));
        assert!(matches!(
            rejected(json!({"title": {"in": {"select": "x"}}})),
            FilterError::MalformedOperand { .. }
        ));
        assert!(matches!(
            rejected(json!({"or": "x"})),
            FilterError::MalformedFilter(_)
        ));
        assert!(matches!(
            rejected(json!({".title": 1})),
            FilterError::MalformedFilter(_)
        ));
    }

    #[test]
    fn test_empty_object_is_empty_tree() {
        let tree = FilterNode::from_json(&json!({})).unwrap();
        assert_eq!(tree, FilterNode::empty());
        assert_eq!(tree.predicate_count(), 0);
    }
}
