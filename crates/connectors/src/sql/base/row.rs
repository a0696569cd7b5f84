use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use core::fmt;
use model::{
    core::value::{FieldValue, Value},
    records::row::RowData,
};
use mysql_async::{Column as MySqlColumn, Row as MySqlRow, Value as MySqlValue, consts::ColumnType};
use rust_decimal::Decimal;
use std::{fmt::Formatter, str::FromStr};
use tokio_postgres::{
    Row as PgRow,
    types::{FromSql, Json as PgJson, Type},
};
use tracing::warn;

/// MySQL's `binary` collation id; marks BLOB/BINARY columns as raw bytes.
const MYSQL_BINARY_CHARSET: u16 = 63;

pub enum DbRow<'a> {
    MySqlRow(&'a MySqlRow),
    PostgresRow(&'a PgRow),
}

impl DbRow<'_> {
    pub fn to_row_data(&self, entity: &str) -> RowData {
        let field_values = match self {
            DbRow::MySqlRow(row) => row
                .columns_ref()
                .iter()
                .enumerate()
                .map(|(idx, column)| FieldValue {
                    name: column.name_str().into_owned(),
                    value: Some(
                        row.as_ref(idx)
                            .map(|value| mysql_value(column, value))
                            .unwrap_or(Value::Null),
                    ),
                })
                .collect(),
            DbRow::PostgresRow(row) => row
                .columns()
                .iter()
                .enumerate()
                .map(|(idx, column)| FieldValue {
                    name: column.name().to_string(),
                    value: Some(pg_value(row, idx, column.type_())),
                })
                .collect(),
        };

        RowData::new(entity, field_values)
    }
}

fn mysql_value(column: &MySqlColumn, value: &MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Int(v) => Value::Int(*v),
        MySqlValue::UInt(v) => match i64::try_from(*v) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Uint(*v),
        },
        MySqlValue::Float(v) => Value::Float(f64::from(*v)),
        MySqlValue::Double(v) => Value::Float(*v),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day));
            match (column.column_type(), date) {
                (ColumnType::MYSQL_TYPE_DATE, Some(date)) => Value::Date(date),
                (_, Some(date)) => date
                    .and_hms_micro_opt(
                        u32::from(*hour),
                        u32::from(*minute),
                        u32::from(*second),
                        *micros,
                    )
                    .map(|naive| Value::Timestamp(naive.and_utc()))
                    .unwrap_or(Value::Null),
                // zero dates such as 0000-00-00
                (_, None) => Value::Null,
            }
        }
        MySqlValue::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u32::from(*hours) + *days * 24;
            Value::String(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}.{micros:06}"))
        }
        MySqlValue::Bytes(bytes) => mysql_bytes(column, bytes),
    }
}

fn mysql_bytes(column: &MySqlColumn, bytes: &[u8]) -> Value {
    let text = || String::from_utf8_lossy(bytes).into_owned();
    match column.column_type() {
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            BigDecimal::from_str(&text())
                .ok()
                .and_then(|v| v.to_f64())
                .map(Value::Float)
                .unwrap_or_else(|| Value::String(text()))
        }
        ColumnType::MYSQL_TYPE_JSON => serde_json::from_slice(bytes)
            .map(Value::Json)
            .unwrap_or_else(|_| Value::String(text())),
        ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_GEOMETRY
            if column.character_set() == MYSQL_BINARY_CHARSET =>
        {
            Value::Bytes(bytes.to_vec())
        }
        _ => Value::String(text()),
    }
}

fn pg_get<'a, T: FromSql<'a>>(row: &'a PgRow, idx: usize) -> Option<T> {
    match row.try_get::<_, Option<T>>(idx) {
        Ok(value) => value,
        Err(err) => {
            warn!("Failed to decode column {}: {}", idx, err);
            None
        }
    }
}

fn pg_value(row: &PgRow, idx: usize, ty: &Type) -> Value {
    let value = match *ty {
        Type::INT2 => pg_get::<i16>(row, idx).map(|v| Value::Int(i64::from(v))),
        Type::INT4 => pg_get::<i32>(row, idx).map(|v| Value::Int(i64::from(v))),
        Type::INT8 => pg_get::<i64>(row, idx).map(Value::Int),
        Type::OID => pg_get::<u32>(row, idx).map(|v| Value::Int(i64::from(v))),
        Type::FLOAT4 => pg_get::<f32>(row, idx).map(|v| Value::Float(f64::from(v))),
        Type::FLOAT8 => pg_get::<f64>(row, idx).map(Value::Float),
        Type::NUMERIC => pg_get::<Decimal>(row, idx)
            .map(|v| v.to_f64().map(Value::Float).unwrap_or(Value::String(v.to_string()))),
        Type::BOOL => pg_get::<bool>(row, idx).map(Value::Boolean),
        Type::JSON | Type::JSONB => pg_get::<PgJson<serde_json::Value>>(row, idx).map(|j| Value::Json(j.0)),
        Type::TIMESTAMPTZ => pg_get::<DateTime<Utc>>(row, idx).map(Value::Timestamp),
        Type::TIMESTAMP => pg_get::<NaiveDateTime>(row, idx).map(|v| Value::Timestamp(v.and_utc())),
        Type::DATE => pg_get::<NaiveDate>(row, idx).map(Value::Date),
        Type::BYTEA => pg_get::<Vec<u8>>(row, idx).map(Value::Bytes),
        Type::UUID => pg_get::<uuid::Uuid>(row, idx).map(Value::Uuid),
        _ => pg_get::<String>(row, idx).map(Value::String),
    };
    value.unwrap_or(Value::Null)
}

impl fmt::Debug for DbRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DbRow::MySqlRow(row) => write!(f, "{row:?}"),
            DbRow::PostgresRow(row) => write!(f, "{row:?}"),
        }
    }
}
