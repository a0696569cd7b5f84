use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use model::core::value::Value;
use mysql_async::{Params, Value as MySqlValue};

/// Positional parameters for the `?` placeholders, in order.
pub fn positional(values: &[Value]) -> Params {
    if values.is_empty() {
        Params::Empty
    } else {
        Params::Positional(values.iter().map(to_mysql).collect())
    }
}

/// Booleans travel as 0/1; text-like values (strings, JSON, UUIDs) as bytes.
pub fn to_mysql(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Int(v) => MySqlValue::Int(*v),
        Value::Uint(v) => MySqlValue::UInt(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::Boolean(v) => MySqlValue::Int(i64::from(*v)),
        Value::String(v) => MySqlValue::Bytes(v.as_bytes().to_vec()),
        Value::Json(v) => MySqlValue::Bytes(v.to_string().into_bytes()),
        Value::Uuid(v) => MySqlValue::Bytes(v.to_string().into_bytes()),
        Value::Bytes(v) => MySqlValue::Bytes(v.clone()),
        Value::Date(d) => datetime(&d.and_time(NaiveTime::MIN)),
        Value::Timestamp(ts) => datetime(&ts.naive_utc()),
    }
}

fn datetime(dt: &NaiveDateTime) -> MySqlValue {
    MySqlValue::Date(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
        dt.nanosecond() / 1_000,
    )
}
