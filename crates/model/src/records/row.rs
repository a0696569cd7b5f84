use crate::core::value::{FieldValue, Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Renders the row as a JSON object, keeping column order.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .field_values
            .iter()
            .map(|f| {
                let value = f
                    .value
                    .as_ref()
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null);
                (f.name.clone(), value)
            })
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowData {
        RowData::new(
            "customeraccount_rtab",
            vec![
                FieldValue {
                    name: "ACCT_ID".to_string(),
                    value: Some(Value::String("U100".to_string())),
                },
                FieldValue {
                    name: "closed_date".to_string(),
                    value: None,
                },
            ],
        )
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let row = row();
        assert_eq!(row.get_value("acct_id"), Value::String("U100".to_string()));
        assert!(row.get("Closed_Date").is_some());
    }

    #[test]
    fn test_missing_and_empty_fields_are_null() {
        let row = row();
        assert_eq!(row.get_value("closed_date"), Value::Null);
        assert_eq!(row.get_value("nope"), Value::Null);
    }
}
